use crate::backend::RoomConnector;
use chrono::Utc;
use room_client_config::SessionConfig;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{
        unbounded_channel,
        UnboundedSender,
    },
    watch,
};
use tokio_util::sync::{
    CancellationToken,
    DropGuard,
};

mod inner;
pub mod messages;
mod state;
pub mod status;
#[cfg(test)]
mod tests;

use inner::RoomSessionInner;
use messages::RoomMessage;
pub use state::{
    DisplayedMessage,
    MediaElement,
    RoomState,
    CAMERA_OFF_LABEL,
    CAMERA_ON_LABEL,
    MUTE_LABEL,
    UNMUTE_LABEL,
};

/// Handle to a room session running in its own task.
///
/// The task connects on spawn and lives until [`RoomSession::close`] is
/// called or the last clone of the handle is dropped.
#[derive(Debug, Clone)]
pub struct RoomSession {
    pub created: chrono::DateTime<Utc>,
    pub state: watch::Receiver<RoomState>,
    _session_task_guard: Arc<DropGuard>,
    sender: UnboundedSender<RoomMessage>,
}

impl RoomSession {
    pub fn spawn<C: RoomConnector>(connector: C, config: SessionConfig) -> Self {
        debug!("Session config: {:#?}", config);

        let (sender, receiver) = unbounded_channel::<RoomMessage>();
        let task_cancellation_token = CancellationToken::new();
        let task_cancellation_guard = task_cancellation_token.clone().drop_guard();
        let (state_sender, state_receiver) = watch::channel(RoomState {
            running: true,
            ..Default::default()
        });

        tokio::task::spawn(async move {
            tokio::select! {
                biased;
                _ = task_cancellation_token.cancelled() => {},

                result = RoomSessionInner::run(connector, config, receiver, state_sender.clone()) => {
                    if let Err(err) = result {
                        error!("Room session failed: {err}");
                    }
                }
            };

            state_sender.send_modify(|state| {
                state.running = false;
            });
            debug!("Room session task finished");
        });

        Self {
            created: Utc::now(),
            state: state_receiver,
            _session_task_guard: Arc::new(task_cancellation_guard),
            sender,
        }
    }
}

impl RoomSession {
    pub async fn close(mut self) {
        if !self.state.borrow().running {
            debug!("Session already closed");
            return;
        }
        if self.sender.send(RoomMessage::Close).is_ok() {
            if let Err(err) = self.state.wait_for(|state| !state.running).await {
                error!("Failed to wait for the session to close: {err}");
            };
        } else {
            error!("Was not able to send RoomMessage::Close message")
        }
    }

    pub fn send_message(&self, message: RoomMessage) {
        if !self.state.borrow().running {
            debug!("Session is closed, dropping message {message}");
            return;
        }
        if self.sender.send(message.clone()).is_err() {
            error!("Was not able to send message: {message}")
        }

        trace!("Sent message {message}");
    }

    pub fn toggle_microphone(&self) {
        self.send_message(RoomMessage::ToggleMicrophone);
    }

    pub fn toggle_camera(&self) {
        self.send_message(RoomMessage::ToggleCamera);
    }

    pub fn leave(&self) {
        self.send_message(RoomMessage::Leave);
    }

    pub fn send_chat(&self, text: impl Into<String>) {
        self.send_message(RoomMessage::SendChat(text.into()));
    }
}
