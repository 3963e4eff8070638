use derive_more::Display;

/// Commands the UI sends to the session worker.
#[derive(Debug, Clone, Display, PartialEq, Eq)]
pub enum RoomMessage {
    ToggleMicrophone,
    ToggleCamera,
    Leave,
    #[display("SendChat")]
    SendChat(String),
    Close,
}
