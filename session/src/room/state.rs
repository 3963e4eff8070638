use crate::{
    backend::{
        TrackInfo,
        TrackKind,
    },
    chat::ChatMessage,
};

pub const MUTE_LABEL: &str = "Mute";
pub const UNMUTE_LABEL: &str = "Unmute";
pub const CAMERA_ON_LABEL: &str = "Cam";
pub const CAMERA_OFF_LABEL: &str = "Cam Off";

/// Observable state of a room session, i.e. everything the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoomState {
    pub running: bool,
    pub connected: bool,
    pub room_name: Option<String>,
    pub status: String,
    pub mic_on: bool,
    pub cam_on: bool,
    pub mute_label: String,
    pub camera_label: String,
    pub local_media: MediaElement,
    pub remote_media: MediaElement,
    pub messages: Vec<DisplayedMessage>,
    /// Number of chat messages sent successfully. The chat input clears
    /// itself when this changes.
    pub sent_messages: u64,
    /// Set once the participant left; the UI navigates away.
    pub left: bool,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            running: false,
            connected: false,
            room_name: None,
            status: String::new(),
            mic_on: true,
            cam_on: true,
            mute_label: MUTE_LABEL.to_string(),
            camera_label: CAMERA_ON_LABEL.to_string(),
            local_media: MediaElement::default(),
            remote_media: MediaElement::default(),
            messages: Vec::new(),
            sent_messages: 0,
            left: false,
        }
    }
}

impl RoomState {
    /// Whether the track is already shown by one of the media elements.
    pub fn is_attached(&self, track: &TrackInfo) -> bool {
        self.local_media.contains(track) || self.remote_media.contains(track)
    }
}

/// A display element with one slot per track kind. Attaching a track
/// replaces whatever track of the same kind was shown before.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MediaElement {
    pub audio: Option<TrackInfo>,
    pub video: Option<TrackInfo>,
}

impl MediaElement {
    /// Returns the track that was replaced, if any.
    pub fn attach(&mut self, track: TrackInfo) -> Option<TrackInfo> {
        let slot = match track.kind {
            TrackKind::Audio => &mut self.audio,
            TrackKind::Video => &mut self.video,
        };
        slot.replace(track)
    }

    pub fn contains(&self, track: &TrackInfo) -> bool {
        [&self.audio, &self.video]
            .into_iter()
            .flatten()
            .any(|attached| attached.sid == track.sid)
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_none() && self.video.is_none()
    }
}

/// Entry of the visible chat list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DisplayedMessage {
    pub message: ChatMessage,
    pub is_me: bool,
}

impl DisplayedMessage {
    pub fn sender_label(&self) -> String {
        if self.is_me {
            format!("{} (você)", self.message.from)
        } else {
            self.message.from.clone()
        }
    }
}
