//! The seam between the session worker and the real-time communication
//! library.
//!
//! Everything that touches the network (signaling, media transport, data
//! delivery) lives behind [`RoomConnector`] and [`RoomHandle`]. The worker
//! only sees opaque track descriptors and a stream of [`RoomEvent`]s.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "livekit")]
mod livekit;

#[cfg(feature = "livekit")]
pub use self::livekit::LiveKitConnector;
use async_trait::async_trait;
use room_client_config::VideoPreset;
use serde::{
    Deserialize,
    Serialize,
};
use strum::Display;
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

/// Failures reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("could not acquire local media: {0}")]
    MediaAcquisition(String),
    #[error("could not publish track: {0}")]
    Publish(String),
    #[error("could not send data: {0}")]
    Data(String),
    #[error("could not change track state: {0}")]
    Track(String),
    #[error("disconnect failed: {0}")]
    Disconnect(String),
    #[error("not connected to a room")]
    NotConnected,
}

pub type RoomResult<T> = Result<T, RoomError>;

/// Options the room is constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOptions {
    /// Pause or downscale remote video depending on how it is displayed.
    pub adaptive_stream: bool,
    /// Stop publishing simulcast layers nobody subscribes to.
    pub dynacast: bool,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            adaptive_stream: true,
            dynacast: true,
        }
    }
}

/// What local media to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub audio: bool,
    pub video: Option<VideoPreset>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoPreset::default()),
        }
    }
}

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Reliability of a data packet.
#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum DataPacketKind {
    Reliable,
    Lossy,
}

/// Descriptor of a media track. The backend keeps the actual media object
/// and refers to it by `sid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub sid: String,
    pub kind: TrackKind,
    /// Identity of the publishing participant.
    pub participant: String,
    /// Human readable description, e.g. `1280x720` for a camera.
    pub label: String,
}

/// Name and identity of the local participant as the room reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalParticipantInfo {
    pub name: Option<String>,
    pub identity: Option<String>,
}

/// Notifications emitted by a connected room, delivered in order.
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
pub enum RoomEvent {
    Connected,
    Disconnected {
        reason: String,
    },
    TrackSubscribed {
        track: TrackInfo,
    },
    TrackUnsubscribed {
        track: TrackInfo,
    },
    DataReceived {
        payload: Vec<u8>,
        participant: Option<String>,
        topic: Option<String>,
    },
}

/// Establishes room connections.
#[async_trait]
pub trait RoomConnector: Send + Sync + 'static {
    type Room: RoomHandle;

    /// Connect with `token`. Without a `server_url` the backend picks its
    /// default address. Returns the room and the stream of its events.
    async fn connect(
        &self,
        server_url: Option<&Url>,
        token: &str,
        options: RoomOptions,
    ) -> RoomResult<(Self::Room, UnboundedReceiver<RoomEvent>)>;
}

/// A connected room.
#[async_trait]
pub trait RoomHandle: Send + Sync + 'static {
    fn name(&self) -> String;

    fn local_participant(&self) -> LocalParticipantInfo;

    /// Acquire local capture devices. Tracks are returned unpublished.
    async fn create_local_tracks(&self, options: CaptureOptions) -> RoomResult<Vec<TrackInfo>>;

    async fn publish_track(&self, track: &TrackInfo) -> RoomResult<()>;

    async fn set_microphone_enabled(&self, enabled: bool) -> RoomResult<()>;

    async fn set_camera_enabled(&self, enabled: bool) -> RoomResult<()>;

    async fn publish_data(&self, payload: Vec<u8>, kind: DataPacketKind) -> RoomResult<()>;

    async fn disconnect(&self) -> RoomResult<()>;
}
