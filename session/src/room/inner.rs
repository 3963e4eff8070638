use super::{
    messages::RoomMessage,
    state::{
        DisplayedMessage,
        CAMERA_OFF_LABEL,
        CAMERA_ON_LABEL,
        MUTE_LABEL,
        UNMUTE_LABEL,
    },
    status,
    RoomState,
};
use crate::{
    backend::{
        CaptureOptions,
        DataPacketKind,
        RoomConnector,
        RoomError,
        RoomEvent,
        RoomHandle as _,
        RoomOptions,
        RoomResult,
        TrackInfo,
        TrackKind,
    },
    chat::{
        sender_name,
        ChatMessage,
    },
};
use eyre::{
    Context as _,
    Result,
};
use room_client_config::SessionConfig;
use tokio::sync::{
    mpsc::UnboundedReceiver,
    watch,
};

/// Async session "worker" that owns the connected room.
/// It processes the commands coming from the UI and the events coming from
/// the room one at a time, in arrival order, and publishes the result as
/// [`RoomState`].
pub(super) struct RoomSessionInner<C: RoomConnector> {
    connector: C,
    config: SessionConfig,
    room: Option<C::Room>,
    mic_on: bool,
    cam_on: bool,
    /// Set when joining failed after the connection was up. The error stays
    /// in the status until the connection drops.
    bootstrap_failed: bool,
    state: watch::Sender<RoomState>,
}

impl<C: RoomConnector> RoomSessionInner<C> {
    #[instrument(level = "debug", skip_all, fields(server = ?config.params.server_url.as_ref().map(|url| url.as_str())))]
    pub(super) async fn run(
        connector: C,
        config: SessionConfig,
        receiver: UnboundedReceiver<RoomMessage>,
        state: watch::Sender<RoomState>,
    ) -> Result<()> {
        let mut session = Self {
            connector,
            config,
            room: None,
            mic_on: true,
            cam_on: true,
            bootstrap_failed: false,
            state,
        };

        let events = session.bootstrap().await;
        session.handle_actions(receiver, events).await
    }

    /// Connect, then capture and publish local media. Failures end up in the
    /// status; there is no retry.
    async fn bootstrap(&mut self) -> Option<UnboundedReceiver<RoomEvent>> {
        let Some(token) = self.config.params.token.clone().filter(|token| !token.is_empty()) else {
            warn!("No access token, not connecting");
            self.set_status(status::MISSING_TOKEN);
            return None;
        };

        let options = RoomOptions {
            adaptive_stream: self.config.adaptive_stream,
            dynacast: self.config.dynacast,
        };

        self.set_status(status::CONNECTING);
        let server_url = self.config.params.server_url.clone();
        let (room, events) = match self.connector.connect(server_url.as_ref(), &token, options).await {
            Ok(connected) => connected,
            Err(err) => {
                self.report_failure(err);
                return None;
            }
        };

        let name = room.name();
        info!(room = name, "Connected to the room");
        self.state.send_modify(|state| {
            state.connected = true;
            state.room_name = Some(name);
        });
        // Held even if publishing fails below, so the controls keep working.
        self.room = Some(room);

        if let Err(err) = self.publish_local_media().await {
            self.bootstrap_failed = true;
            self.report_failure(err);
        }

        Some(events)
    }

    async fn publish_local_media(&self) -> RoomResult<()> {
        let room = self.room.as_ref().ok_or(RoomError::NotConnected)?;

        let tracks = room
            .create_local_tracks(CaptureOptions {
                audio: true,
                video: Some(self.config.video_preset),
            })
            .await?;

        for track in tracks {
            room.publish_track(&track).await?;
            debug!(sid = track.sid, kind = %track.kind, "Published local track");
            if track.kind == TrackKind::Video {
                self.state.send_modify(|state| {
                    state.local_media.attach(track);
                });
            }
        }

        self.set_status(status::connected(&room.name()));
        Ok(())
    }

    async fn handle_actions(
        mut self,
        mut receiver: UnboundedReceiver<RoomMessage>,
        mut events: Option<UnboundedReceiver<RoomEvent>>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                biased;

                message = receiver.recv() => {
                    let Some(message) = message else {
                        debug!("Session handle dropped");
                        break;
                    };

                    let action = message.to_string();
                    let result = match message {
                        RoomMessage::Close => {
                            self.close().await;
                            return Ok(());
                        }
                        RoomMessage::ToggleMicrophone => self.toggle_microphone().await,
                        RoomMessage::ToggleCamera => self.toggle_camera().await,
                        RoomMessage::Leave => self.leave().await,
                        RoomMessage::SendChat(text) => self.send_chat(&text).await,
                    };

                    if let Err(err) = result {
                        error!("Running action {action} failed with error: {err:?}");
                    }
                },

                Some(event) = next_event(&mut events) => {
                    self.handle_event(event);
                },
            }
        }

        self.state.send_modify(|state| {
            state.running = false;
        });

        Ok(())
    }

    fn handle_event(&mut self, event: RoomEvent) {
        let kind: &'static str = (&event).into();
        trace!(event = kind, "Room event");

        match event {
            RoomEvent::Connected => {
                let Some(name) = self.room.as_ref().map(|room| room.name()) else {
                    return;
                };
                self.state.send_modify(|state| {
                    state.connected = true;
                    state.room_name = Some(name.clone());
                });
                if self.bootstrap_failed {
                    debug!("Keeping the join error in the status");
                    return;
                }
                self.set_status(status::connected(&name));
            }
            RoomEvent::Disconnected { reason } => {
                info!(reason, "Disconnected from the room");
                self.bootstrap_failed = false;
                self.state.send_modify(|state| {
                    state.connected = false;
                });
                self.set_status(status::DISCONNECTED);
            }
            RoomEvent::TrackSubscribed { track } => self.attach_remote(track),
            RoomEvent::TrackUnsubscribed { track } => {
                // The remote element keeps showing whatever it had.
                debug!(sid = track.sid, participant = track.participant, "Track unsubscribed");
            }
            RoomEvent::DataReceived {
                payload, participant, ..
            } => self.receive_chat(&payload, participant.as_deref()),
        }
    }

    fn attach_remote(&self, track: TrackInfo) {
        self.state.send_if_modified(|state| {
            if state.is_attached(&track) {
                trace!(sid = track.sid, "Track already attached");
                return false;
            }
            debug!(sid = track.sid, participant = track.participant, kind = %track.kind, "Attaching remote track");
            if let Some(previous) = state.remote_media.attach(track) {
                debug!(sid = previous.sid, participant = previous.participant, "Replaced remote track");
            }
            true
        });
    }

    fn receive_chat(&self, payload: &[u8], participant: Option<&str>) {
        match ChatMessage::decode(payload) {
            Ok(message) => {
                debug!(from = message.from, ?participant, "Received chat message");
                self.state.send_modify(|state| {
                    state.messages.push(DisplayedMessage { message, is_me: false });
                });
            }
            Err(err) => warn!(?participant, "Mensagem inválida: {err}"),
        }
    }
}

impl<C: RoomConnector> RoomSessionInner<C> {
    async fn toggle_microphone(&mut self) -> Result<()> {
        let Some(room) = &self.room else {
            debug!("Not in a room, ignoring microphone toggle");
            return Ok(());
        };

        let enabled = !self.mic_on;
        room.set_microphone_enabled(enabled)
            .await
            .wrap_err_with(|| format!("Could not set the microphone to enabled={enabled}"))?;
        self.mic_on = enabled;

        self.state.send_modify(|state| {
            state.mic_on = enabled;
            state.mute_label = if enabled { MUTE_LABEL } else { UNMUTE_LABEL }.to_string();
        });
        info!(enabled, "Toggled microphone");
        Ok(())
    }

    async fn toggle_camera(&mut self) -> Result<()> {
        let Some(room) = &self.room else {
            debug!("Not in a room, ignoring camera toggle");
            return Ok(());
        };

        let enabled = !self.cam_on;
        room.set_camera_enabled(enabled)
            .await
            .wrap_err_with(|| format!("Could not set the camera to enabled={enabled}"))?;
        self.cam_on = enabled;

        self.state.send_modify(|state| {
            state.cam_on = enabled;
            state.camera_label = if enabled { CAMERA_ON_LABEL } else { CAMERA_OFF_LABEL }.to_string();
        });
        info!(enabled, "Toggled camera");
        Ok(())
    }

    /// Disconnect (failures are ignored) and navigate back.
    async fn leave(&mut self) -> Result<()> {
        if let Some(room) = self.room.take() {
            match room.disconnect().await {
                Ok(()) => info!("Left the room"),
                Err(err) => debug!("Ignoring failed disconnect: {err}"),
            }
        }

        self.state.send_modify(|state| {
            state.connected = false;
            state.left = true;
        });
        Ok(())
    }

    async fn send_chat(&mut self, input: &str) -> Result<()> {
        let text = input.trim();
        let Some(room) = &self.room else {
            debug!("Not in a room, dropping chat message");
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }

        let local = room.local_participant();
        let message = ChatMessage::new(sender_name(local.name.as_deref(), local.identity.as_deref()), text);
        let payload = message.encode()?;

        room.publish_data(payload, DataPacketKind::Reliable)
            .await
            .context("Falha ao enviar mensagem")?;

        self.state.send_modify(|state| {
            state.messages.push(DisplayedMessage { message, is_me: true });
            state.sent_messages += 1;
        });
        Ok(())
    }

    async fn close(&mut self) {
        debug!("Closing the session...");
        if let Some(room) = self.room.take() {
            if let Err(err) = room.disconnect().await {
                warn!("Failed to disconnect while closing: {err}");
            }
        }
        self.state.send_modify(|state| {
            state.connected = false;
            state.running = false;
        });
        info!("Closed the session");
    }

    fn report_failure(&self, err: RoomError) {
        error!("Failed to join the room: {err:?}");
        self.set_status(status::failed(&err));
    }

    fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        info!(status = %text, "Status changed");
        self.state.send_modify(|state| {
            state.status = text;
        });
    }
}

/// Next event of the room, pending forever once there is no room or its
/// stream ended.
async fn next_event(events: &mut Option<UnboundedReceiver<RoomEvent>>) -> Option<RoomEvent> {
    let Some(receiver) = events.as_mut() else {
        return std::future::pending().await;
    };
    let event = receiver.recv().await;
    if event.is_none() {
        debug!("Room event stream ended");
        *events = None;
    }
    event
}
