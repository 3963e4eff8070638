#[macro_use]
extern crate tracing;

pub mod backend;
pub mod chat;
pub mod room;

pub use backend::{
    RoomConnector,
    RoomError,
    RoomEvent,
    RoomHandle,
};
#[cfg(feature = "livekit")]
pub use backend::LiveKitConnector;
pub use chat::ChatMessage;
pub use room::{
    messages::RoomMessage,
    DisplayedMessage,
    MediaElement,
    RoomSession,
    RoomState,
};
