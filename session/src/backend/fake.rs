//! In-memory backend that records every call and lets tests inject room
//! events and failures.

use super::{
    CaptureOptions,
    DataPacketKind,
    LocalParticipantInfo,
    RoomConnector,
    RoomError,
    RoomEvent,
    RoomHandle,
    RoomOptions,
    RoomResult,
    TrackInfo,
    TrackKind,
};
use async_trait::async_trait;
use std::sync::{
    Arc,
    Mutex,
};
use tokio::sync::mpsc::{
    unbounded_channel,
    UnboundedReceiver,
    UnboundedSender,
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Connect {
        server_url: Option<String>,
        token: String,
        options: RoomOptions,
    },
    CreateLocalTracks(CaptureOptions),
    PublishTrack(String),
    SetMicrophoneEnabled(bool),
    SetCameraEnabled(bool),
    PublishData {
        payload: Vec<u8>,
        kind: DataPacketKind,
    },
    Disconnect,
}

#[derive(Debug, Default)]
struct Failures {
    connect: Option<RoomError>,
    create_local_tracks: Option<RoomError>,
    publish_track: Option<RoomError>,
    set_microphone_enabled: Option<RoomError>,
    publish_data: Option<RoomError>,
    disconnect: Option<RoomError>,
}

#[derive(Debug)]
struct Shared {
    room_name: String,
    local: LocalParticipantInfo,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Failures>,
    events_tx: UnboundedSender<RoomEvent>,
    events_rx: Mutex<Option<UnboundedReceiver<RoomEvent>>>,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeConnector {
    shared: Arc<Shared>,
}

impl FakeConnector {
    pub(crate) fn new(room_name: &str) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                room_name: room_name.to_string(),
                local: LocalParticipantInfo {
                    name: Some("Ana".to_string()),
                    identity: Some("ana-1".to_string()),
                },
                calls: Default::default(),
                failures: Default::default(),
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
            }),
        }
    }

    pub(crate) fn with_local(mut self, name: Option<&str>, identity: Option<&str>) -> Self {
        let shared = Arc::get_mut(&mut self.shared).expect("configure the fake before cloning it");
        shared.local = LocalParticipantInfo {
            name: name.map(str::to_string),
            identity: identity.map(str::to_string),
        };
        self
    }

    pub(crate) fn fail_connect(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().connect = Some(err);
        self
    }

    pub(crate) fn fail_capture(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().create_local_tracks = Some(err);
        self
    }

    pub(crate) fn fail_publish(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().publish_track = Some(err);
        self
    }

    pub(crate) fn fail_microphone(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().set_microphone_enabled = Some(err);
        self
    }

    pub(crate) fn fail_publish_data(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().publish_data = Some(err);
        self
    }

    pub(crate) fn fail_disconnect(self, err: RoomError) -> Self {
        self.shared.failures.lock().unwrap().disconnect = Some(err);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.shared.calls.lock().unwrap().clone()
    }

    /// Sender to inject events into the room's event stream.
    pub(crate) fn events(&self) -> UnboundedSender<RoomEvent> {
        self.shared.events_tx.clone()
    }
}

impl Shared {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(&self, pick: impl FnOnce(&Failures) -> &Option<RoomError>) -> RoomResult<()> {
        match pick(&self.failures.lock().unwrap()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RoomConnector for FakeConnector {
    type Room = FakeRoom;

    async fn connect(
        &self,
        server_url: Option<&Url>,
        token: &str,
        options: RoomOptions,
    ) -> RoomResult<(FakeRoom, UnboundedReceiver<RoomEvent>)> {
        self.shared.record(Call::Connect {
            server_url: server_url.map(|url| url.to_string()),
            token: token.to_string(),
            options,
        });
        self.shared.failure(|failures| &failures.connect)?;

        let events = self
            .shared
            .events_rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| RoomError::Connect("fake room connected twice".to_string()))?;

        Ok((
            FakeRoom {
                shared: self.shared.clone(),
            },
            events,
        ))
    }
}

#[derive(Debug)]
pub(crate) struct FakeRoom {
    shared: Arc<Shared>,
}

#[async_trait]
impl RoomHandle for FakeRoom {
    fn name(&self) -> String {
        self.shared.room_name.clone()
    }

    fn local_participant(&self) -> LocalParticipantInfo {
        self.shared.local.clone()
    }

    async fn create_local_tracks(&self, options: CaptureOptions) -> RoomResult<Vec<TrackInfo>> {
        self.shared.record(Call::CreateLocalTracks(options));
        self.shared.failure(|failures| &failures.create_local_tracks)?;

        let identity = self.shared.local.identity.clone().unwrap_or_default();
        let mut tracks = Vec::new();
        if options.audio {
            tracks.push(TrackInfo {
                sid: "TR_microphone".to_string(),
                kind: TrackKind::Audio,
                participant: identity.clone(),
                label: "microphone".to_string(),
            });
        }
        if let Some(preset) = options.video {
            tracks.push(TrackInfo {
                sid: "TR_camera".to_string(),
                kind: TrackKind::Video,
                participant: identity,
                label: format!("{}x{}", preset.width(), preset.height()),
            });
        }
        Ok(tracks)
    }

    async fn publish_track(&self, track: &TrackInfo) -> RoomResult<()> {
        self.shared.record(Call::PublishTrack(track.sid.clone()));
        self.shared.failure(|failures| &failures.publish_track)
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.shared.record(Call::SetMicrophoneEnabled(enabled));
        self.shared.failure(|failures| &failures.set_microphone_enabled)
    }

    async fn set_camera_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.shared.record(Call::SetCameraEnabled(enabled));
        Ok(())
    }

    async fn publish_data(&self, payload: Vec<u8>, kind: DataPacketKind) -> RoomResult<()> {
        self.shared.record(Call::PublishData { payload, kind });
        self.shared.failure(|failures| &failures.publish_data)
    }

    async fn disconnect(&self) -> RoomResult<()> {
        self.shared.record(Call::Disconnect);
        self.shared.failure(|failures| &failures.disconnect)
    }
}
