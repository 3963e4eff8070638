//! [`RoomConnector`] on top of the LiveKit Rust SDK.
//!
//! A terminal has no capture devices to hand to the SDK, so the local tracks
//! are fed by pacing tasks that push blank video frames and silence at the
//! rate of the configured preset. They stop when the room is left.

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
use livekit::{
    options::{
        TrackPublishOptions,
        VideoEncoding,
    },
    prelude::{
        ConnectionState,
        DataPacket,
        LocalAudioTrack,
        LocalTrack,
        LocalVideoTrack,
        RemoteParticipant,
        RemoteTrack,
        Room,
        TrackSource,
    },
    webrtc::{
        audio_frame::AudioFrame,
        audio_source::{
            native::NativeAudioSource,
            AudioSourceOptions,
            RtcAudioSource,
        },
        video_frame::{
            I420Buffer,
            VideoFrame,
            VideoRotation,
        },
        video_source::{
            native::NativeVideoSource,
            RtcVideoSource,
            VideoResolution,
        },
    },
};
use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};
use tokio::sync::mpsc::{
    unbounded_channel,
    UnboundedReceiver,
    UnboundedSender,
};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Environment variable holding the server address when none is passed.
pub const SERVER_URL_ENV: &str = "LIVEKIT_URL";

const MICROPHONE_SID: &str = "local-microphone";
const CAMERA_SID: &str = "local-camera";
const SAMPLE_RATE: u32 = 48_000;
const AUDIO_CHANNELS: u32 = 1;
const AUDIO_FRAME_MS: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct LiveKitConnector;

impl LiveKitConnector {
    fn resolve_server_url(&self, server_url: Option<&Url>) -> RoomResult<String> {
        if let Some(url) = server_url {
            return Ok(url.to_string());
        }
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| RoomError::Connect(format!("no server address given and {SERVER_URL_ENV} is not set")))
    }
}

#[async_trait]
impl RoomConnector for LiveKitConnector {
    type Room = LiveKitRoom;

    async fn connect(
        &self,
        server_url: Option<&Url>,
        token: &str,
        options: RoomOptions,
    ) -> RoomResult<(LiveKitRoom, UnboundedReceiver<RoomEvent>)> {
        let url = self.resolve_server_url(server_url)?;

        let mut room_options = livekit::RoomOptions::default();
        room_options.adaptive_stream = options.adaptive_stream;
        room_options.dynacast = options.dynacast;

        debug!(url, ?options, "Connecting to LiveKit");
        let (room, sdk_events) = Room::connect(&url, token, room_options)
            .await
            .map_err(|err| RoomError::Connect(err.to_string()))?;

        let (sender, events) = unbounded_channel();
        let capture = CancellationToken::new();
        tokio::spawn(forward_events(sdk_events, sender, capture.clone()));

        Ok((
            LiveKitRoom {
                room,
                local_tracks: Default::default(),
                capture,
            },
            events,
        ))
    }
}

pub struct LiveKitRoom {
    room: Room,
    local_tracks: Mutex<HashMap<String, LocalMedia>>,
    capture: CancellationToken,
}

#[derive(Clone)]
struct LocalMedia {
    track: LocalTrack,
    options: TrackPublishOptions,
}

impl LiveKitRoom {
    fn local_track(&self, sid: &str) -> RoomResult<LocalMedia> {
        self.local_tracks
            .lock()
            .map_err(|_| RoomError::Track("local track registry poisoned".to_string()))?
            .get(sid)
            .cloned()
            .ok_or_else(|| RoomError::Track(format!("unknown local track {sid}")))
    }

    fn set_enabled(&self, sid: &str, enabled: bool) -> RoomResult<()> {
        let media = self.local_track(sid)?;
        match (&media.track, enabled) {
            (LocalTrack::Audio(track), true) => track.unmute(),
            (LocalTrack::Audio(track), false) => track.mute(),
            (LocalTrack::Video(track), true) => track.unmute(),
            (LocalTrack::Video(track), false) => track.mute(),
        }
        Ok(())
    }

    fn create_microphone(&self, identity: &str) -> TrackInfo {
        let source = NativeAudioSource::new(AudioSourceOptions::default(), SAMPLE_RATE, AUDIO_CHANNELS, 1000);
        let track = LocalAudioTrack::create_audio_track("microphone", RtcAudioSource::Native(source.clone()));
        tokio::spawn(feed_silence(source, self.capture.clone()));

        self.register(MICROPHONE_SID, LocalTrack::Audio(track), TrackPublishOptions {
            source: TrackSource::Microphone,
            ..Default::default()
        });
        TrackInfo {
            sid: MICROPHONE_SID.to_string(),
            kind: TrackKind::Audio,
            participant: identity.to_string(),
            label: "microphone".to_string(),
        }
    }

    fn create_camera(&self, identity: &str, preset: room_client_config::VideoPreset) -> TrackInfo {
        let spec = preset.spec();
        let source = NativeVideoSource::new(VideoResolution {
            width: spec.width,
            height: spec.height,
        });
        let track = LocalVideoTrack::create_video_track("camera", RtcVideoSource::Native(source.clone()));
        tokio::spawn(feed_blank_video(source, spec.width, spec.height, spec.max_framerate, self.capture.clone()));

        self.register(CAMERA_SID, LocalTrack::Video(track), TrackPublishOptions {
            source: TrackSource::Camera,
            video_encoding: Some(VideoEncoding {
                max_bitrate: spec.max_bitrate,
                max_framerate: spec.max_framerate.into(),
            }),
            ..Default::default()
        });
        TrackInfo {
            sid: CAMERA_SID.to_string(),
            kind: TrackKind::Video,
            participant: identity.to_string(),
            label: format!("{}x{}", spec.width, spec.height),
        }
    }

    fn register(&self, sid: &str, track: LocalTrack, options: TrackPublishOptions) {
        match self.local_tracks.lock() {
            Ok(mut tracks) => {
                tracks.insert(sid.to_string(), LocalMedia { track, options });
            }
            Err(err) => error!("Could not register local track {sid}: {err}"),
        }
    }
}

#[async_trait]
impl RoomHandle for LiveKitRoom {
    fn name(&self) -> String {
        self.room.name()
    }

    fn local_participant(&self) -> LocalParticipantInfo {
        let local = self.room.local_participant();
        LocalParticipantInfo {
            name: Some(local.name()).filter(|name| !name.is_empty()),
            identity: Some(local.identity().to_string()).filter(|identity| !identity.is_empty()),
        }
    }

    async fn create_local_tracks(&self, options: CaptureOptions) -> RoomResult<Vec<TrackInfo>> {
        let identity = self.room.local_participant().identity().to_string();
        let mut tracks = Vec::new();
        if options.audio {
            tracks.push(self.create_microphone(&identity));
        }
        if let Some(preset) = options.video {
            tracks.push(self.create_camera(&identity, preset));
        }
        Ok(tracks)
    }

    async fn publish_track(&self, track: &TrackInfo) -> RoomResult<()> {
        let media = self.local_track(&track.sid)?;
        let publication = self
            .room
            .local_participant()
            .publish_track(media.track, media.options)
            .await
            .map_err(|err| RoomError::Publish(err.to_string()))?;
        debug!(sid = %publication.sid(), local = track.sid, "Track published");
        Ok(())
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.set_enabled(MICROPHONE_SID, enabled)
    }

    async fn set_camera_enabled(&self, enabled: bool) -> RoomResult<()> {
        self.set_enabled(CAMERA_SID, enabled)
    }

    async fn publish_data(&self, payload: Vec<u8>, kind: DataPacketKind) -> RoomResult<()> {
        self.room
            .local_participant()
            .publish_data(DataPacket {
                payload,
                reliable: kind == DataPacketKind::Reliable,
                ..Default::default()
            })
            .await
            .map_err(|err| RoomError::Data(err.to_string()))
    }

    async fn disconnect(&self) -> RoomResult<()> {
        self.capture.cancel();
        self.room.close().await.map_err(|err| RoomError::Disconnect(err.to_string()))
    }
}

async fn forward_events(
    mut sdk_events: UnboundedReceiver<livekit::RoomEvent>,
    sender: UnboundedSender<RoomEvent>,
    capture: CancellationToken,
) {
    while let Some(event) = sdk_events.recv().await {
        let Some(event) = map_event(event) else {
            continue;
        };
        if sender.send(event).is_err() {
            debug!("Room event receiver dropped");
            break;
        }
    }
    capture.cancel();
    debug!("LiveKit event stream ended");
}

fn map_event(event: livekit::RoomEvent) -> Option<RoomEvent> {
    let event = match event {
        livekit::RoomEvent::ConnectionStateChanged(ConnectionState::Connected) => RoomEvent::Connected,
        livekit::RoomEvent::Disconnected { reason } => RoomEvent::Disconnected {
            reason: format!("{reason:?}"),
        },
        livekit::RoomEvent::TrackSubscribed { track, participant, .. } => RoomEvent::TrackSubscribed {
            track: remote_track_info(&track, &participant),
        },
        livekit::RoomEvent::TrackUnsubscribed { track, participant, .. } => RoomEvent::TrackUnsubscribed {
            track: remote_track_info(&track, &participant),
        },
        livekit::RoomEvent::DataReceived {
            payload,
            topic,
            participant,
            ..
        } => RoomEvent::DataReceived {
            payload: payload.to_vec(),
            participant: participant.map(|participant| participant.identity().to_string()),
            topic,
        },
        _ => return None,
    };
    Some(event)
}

fn remote_track_info(track: &RemoteTrack, participant: &RemoteParticipant) -> TrackInfo {
    let kind = match track {
        RemoteTrack::Audio(_) => TrackKind::Audio,
        RemoteTrack::Video(_) => TrackKind::Video,
    };
    TrackInfo {
        sid: track.sid().to_string(),
        kind,
        participant: participant.identity().to_string(),
        label: track.name(),
    }
}

async fn feed_silence(source: NativeAudioSource, cancel: CancellationToken) {
    let samples_per_channel = SAMPLE_RATE / 1000 * AUDIO_FRAME_MS;
    let silence = vec![0i16; (samples_per_channel * AUDIO_CHANNELS) as usize];
    let mut ticker = tokio::time::interval(Duration::from_millis(AUDIO_FRAME_MS.into()));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let frame = AudioFrame {
                    data: silence.as_slice().into(),
                    sample_rate: SAMPLE_RATE,
                    num_channels: AUDIO_CHANNELS,
                    samples_per_channel,
                };
                if let Err(err) = source.capture_frame(&frame).await {
                    warn!("Dropping audio frame: {err}");
                }
            }
        }
    }
}

async fn feed_blank_video(source: NativeVideoSource, width: u32, height: u32, fps: u32, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1) / fps.max(1));
    let started = tokio::time::Instant::now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let frame = VideoFrame {
                    rotation: VideoRotation::VideoRotation0,
                    buffer: I420Buffer::new(width, height),
                    timestamp_us: started.elapsed().as_micros() as i64,
                };
                source.capture_frame(&frame);
            }
        }
    }
}
