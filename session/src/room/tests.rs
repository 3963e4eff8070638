use super::*;
use crate::{
    backend::{
        fake::{
            Call,
            FakeConnector,
        },
        CaptureOptions,
        DataPacketKind,
        RoomError,
        RoomEvent,
        RoomOptions,
        TrackInfo,
        TrackKind,
    },
    chat::ChatMessage,
};
use pretty_assertions::assert_eq;
use room_client_config::{
    ConnectionParams,
    VideoPreset,
};
use std::time::Duration;

fn config(token: Option<&str>) -> SessionConfig {
    SessionConfig::with_params(ConnectionParams {
        token: token.map(str::to_string),
        server_url: Some("wss://rtc.example.com".parse().unwrap()),
    })
}

async fn wait_for(session: &RoomSession, predicate: impl FnMut(&RoomState) -> bool) -> RoomState {
    let mut state = session.state.clone();
    let result = tokio::time::timeout(Duration::from_secs(5), state.wait_for(predicate))
        .await
        .expect("timed out waiting for the room state")
        .expect("session task ended")
        .clone();
    result
}

async fn connected(fake: &FakeConnector) -> RoomSession {
    let session = RoomSession::spawn(fake.clone(), config(Some("token-1")));
    wait_for(&session, |state| state.status == status::connected("sala-1")).await;
    session
}

fn remote_track(sid: &str, participant: &str, kind: TrackKind) -> TrackInfo {
    TrackInfo {
        sid: sid.to_string(),
        kind,
        participant: participant.to_string(),
        label: String::new(),
    }
}

fn published_data(fake: &FakeConnector) -> Vec<(Vec<u8>, DataPacketKind)> {
    fake.calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::PublishData { payload, kind } => Some((payload, kind)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn missing_token_never_connects() {
    let fake = FakeConnector::new("sala-1");
    let session = RoomSession::spawn(fake.clone(), config(None));

    let state = wait_for(&session, |state| state.status == status::MISSING_TOKEN).await;
    assert!(!state.connected);

    // Controls without a room do nothing, leaving still navigates back.
    session.toggle_microphone();
    session.send_chat("olá");
    session.leave();
    let state = wait_for(&session, |state| state.left).await;
    assert_eq!(state.mute_label, MUTE_LABEL);
    assert!(state.messages.is_empty());
    assert_eq!(fake.calls(), vec![]);
}

#[tokio::test]
async fn empty_token_counts_as_missing() {
    let fake = FakeConnector::new("sala-1");
    let session = RoomSession::spawn(fake.clone(), config(Some("")));
    wait_for(&session, |state| state.status == status::MISSING_TOKEN).await;
    assert_eq!(fake.calls(), vec![]);
}

#[tokio::test]
async fn connects_and_publishes_local_media() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;

    let state = session.state.borrow().clone();
    assert_eq!(state.status, "Conectado: sala-1");
    assert!(state.connected);
    assert_eq!(state.room_name.as_deref(), Some("sala-1"));
    assert_eq!(state.local_media.video.as_ref().map(|t| t.sid.as_str()), Some("TR_camera"));
    assert_eq!(state.local_media.audio, None);

    assert_eq!(
        fake.calls(),
        vec![
            Call::Connect {
                server_url: Some("wss://rtc.example.com/".to_string()),
                token: "token-1".to_string(),
                options: RoomOptions {
                    adaptive_stream: true,
                    dynacast: true,
                },
            },
            Call::CreateLocalTracks(CaptureOptions {
                audio: true,
                video: Some(VideoPreset::H720),
            }),
            Call::PublishTrack("TR_microphone".to_string()),
            Call::PublishTrack("TR_camera".to_string()),
        ]
    );
}

#[tokio::test]
async fn connect_failure_is_reported() {
    let fake = FakeConnector::new("sala-1").fail_connect(RoomError::Connect("token rejected".to_string()));
    let session = RoomSession::spawn(fake.clone(), config(Some("token-1")));

    let state = wait_for(&session, |state| state.status.starts_with("Erro: ")).await;
    assert!(state.status.contains("token rejected"), "{}", state.status);
    assert!(!state.connected);
    assert_eq!(fake.calls().len(), 1);
    assert!(matches!(fake.calls()[0], Call::Connect { .. }));
}

#[tokio::test]
async fn capture_failure_stops_before_publishing() {
    let fake =
        FakeConnector::new("sala-1").fail_capture(RoomError::MediaAcquisition("camera permission denied".to_string()));
    let session = RoomSession::spawn(fake.clone(), config(Some("token-1")));

    let state = wait_for(&session, |state| state.status.starts_with("Erro: ")).await;
    assert!(state.status.contains("camera permission denied"), "{}", state.status);
    assert!(state.local_media.is_empty());
    assert!(!fake.calls().iter().any(|call| matches!(call, Call::PublishTrack(_))));

    // The room is still held, so the controls reach it.
    session.toggle_camera();
    let state = wait_for(&session, |state| !state.cam_on).await;
    assert_eq!(state.camera_label, CAMERA_OFF_LABEL);
    assert!(fake.calls().contains(&Call::SetCameraEnabled(false)));
}

#[tokio::test]
async fn join_error_survives_a_late_connected_event() {
    let fake =
        FakeConnector::new("sala-1").fail_capture(RoomError::MediaAcquisition("camera permission denied".to_string()));
    // Queued while connecting, read once joining is over.
    fake.events().send(RoomEvent::Connected).unwrap();
    let session = RoomSession::spawn(fake.clone(), config(Some("token-1")));
    wait_for(&session, |state| state.status.starts_with("Erro: ")).await;

    // Events are handled in order, so the chat message lands after `Connected`.
    let payload = ChatMessage::new("Bia", "oi").encode().unwrap();
    fake.events()
        .send(RoomEvent::DataReceived {
            payload,
            participant: Some("bia-1".to_string()),
            topic: None,
        })
        .unwrap();
    let state = wait_for(&session, |state| !state.messages.is_empty()).await;

    assert_eq!(state.status, status::failed(RoomError::MediaAcquisition("camera permission denied".to_string())));
    assert!(state.connected);

    // A reconnect after a drop reports normally again.
    fake.events()
        .send(RoomEvent::Disconnected {
            reason: "network".to_string(),
        })
        .unwrap();
    wait_for(&session, |state| state.status == status::DISCONNECTED).await;
    fake.events().send(RoomEvent::Connected).unwrap();
    wait_for(&session, |state| state.status == status::connected("sala-1")).await;
}

#[tokio::test]
async fn publish_failure_stops_remaining_publishes() {
    let fake = FakeConnector::new("sala-1").fail_publish(RoomError::Publish("sfu refused the track".to_string()));
    let session = RoomSession::spawn(fake.clone(), config(Some("token-1")));

    let state = wait_for(&session, |state| state.status.starts_with("Erro: ")).await;
    assert!(state.status.contains("sfu refused the track"), "{}", state.status);
    assert!(state.local_media.is_empty());

    let publishes = fake
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::PublishTrack(_)))
        .collect::<Vec<_>>();
    assert_eq!(publishes, vec![Call::PublishTrack("TR_microphone".to_string())]);
}

#[tokio::test]
async fn sending_chat_publishes_and_echoes() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;

    session.send_chat("   ");
    session.send_chat("  olá, mundo  ");
    let state = wait_for(&session, |state| state.sent_messages == 1).await;

    let data = published_data(&fake);
    assert_eq!(data.len(), 1);
    let (payload, kind) = &data[0];
    assert_eq!(*kind, DataPacketKind::Reliable);

    let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["from"], "Ana");
    assert_eq!(object["text"], "olá, mundo");
    assert!(object["ts"].is_number());

    let sent = ChatMessage::decode(payload).unwrap();
    assert_eq!(state.messages, vec![DisplayedMessage { message: sent, is_me: true }]);
}

#[tokio::test]
async fn sender_falls_back_to_identity_then_default() {
    let fake = FakeConnector::new("sala-1").with_local(None, Some("ana-1"));
    let session = connected(&fake).await;
    session.send_chat("oi");
    let state = wait_for(&session, |state| state.sent_messages == 1).await;
    assert_eq!(state.messages[0].message.from, "ana-1");

    let fake = FakeConnector::new("sala-1").with_local(Some(""), None);
    let session = connected(&fake).await;
    session.send_chat("oi");
    let state = wait_for(&session, |state| state.sent_messages == 1).await;
    assert_eq!(state.messages[0].message.from, "Você");
}

#[tokio::test]
async fn failed_send_keeps_the_list_unchanged() {
    let fake = FakeConnector::new("sala-1").fail_publish_data(RoomError::Data("channel closed".to_string()));
    let session = connected(&fake).await;

    session.send_chat("perdida");
    session.toggle_camera();
    let state = wait_for(&session, |state| !state.cam_on).await;

    assert_eq!(published_data(&fake).len(), 1);
    assert!(state.messages.is_empty());
    assert_eq!(state.sent_messages, 0);
}

#[tokio::test]
async fn incoming_chat_needs_from_and_text() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;
    let events = fake.events();

    for payload in [
        br#"{"text":"sem remetente"}"#.to_vec(),
        br#"{"from":"Bia"}"#.to_vec(),
        b"not json".to_vec(),
        br#"{"from":"Bia","text":"oi","ts":1700000000000}"#.to_vec(),
    ] {
        events
            .send(RoomEvent::DataReceived {
                payload,
                participant: Some("bia-1".to_string()),
                topic: None,
            })
            .unwrap();
    }

    let state = wait_for(&session, |state| !state.messages.is_empty()).await;
    assert_eq!(
        state.messages,
        vec![DisplayedMessage {
            message: ChatMessage {
                from: "Bia".to_string(),
                text: "oi".to_string(),
                ts: 1_700_000_000_000,
            },
            is_me: false,
        }]
    );
    assert_eq!(state.messages[0].sender_label(), "Bia");
}

#[tokio::test]
async fn toggling_mute_twice_restores_the_label() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;

    session.toggle_microphone();
    let state = wait_for(&session, |state| !state.mic_on).await;
    assert_eq!(state.mute_label, UNMUTE_LABEL);

    session.toggle_microphone();
    let state = wait_for(&session, |state| state.mic_on).await;
    assert_eq!(state.mute_label, MUTE_LABEL);

    let toggles = fake
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::SetMicrophoneEnabled(_)))
        .collect::<Vec<_>>();
    assert_eq!(
        toggles,
        vec![Call::SetMicrophoneEnabled(false), Call::SetMicrophoneEnabled(true)]
    );
}

#[tokio::test]
async fn toggling_the_camera_twice_restores_the_label() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;

    session.toggle_camera();
    let state = wait_for(&session, |state| !state.cam_on).await;
    assert_eq!(state.camera_label, CAMERA_OFF_LABEL);

    session.toggle_camera();
    let state = wait_for(&session, |state| state.cam_on).await;
    assert_eq!(state.camera_label, CAMERA_ON_LABEL);

    let toggles = fake
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::SetCameraEnabled(_)))
        .collect::<Vec<_>>();
    assert_eq!(toggles, vec![Call::SetCameraEnabled(false), Call::SetCameraEnabled(true)]);
}

#[tokio::test]
async fn failed_toggle_keeps_the_label() {
    let fake = FakeConnector::new("sala-1").fail_microphone(RoomError::Track("no microphone".to_string()));
    let session = connected(&fake).await;

    session.toggle_microphone();
    session.toggle_camera();
    let state = wait_for(&session, |state| !state.cam_on).await;

    assert!(fake.calls().contains(&Call::SetMicrophoneEnabled(false)));
    assert!(state.mic_on);
    assert_eq!(state.mute_label, MUTE_LABEL);
}

#[tokio::test]
async fn leave_disconnects_once_and_navigates_back_even_on_failure() {
    let fake = FakeConnector::new("sala-1").fail_disconnect(RoomError::Disconnect("socket gone".to_string()));
    let session = connected(&fake).await;

    session.leave();
    let state = wait_for(&session, |state| state.left).await;
    assert!(!state.connected);

    // The room is gone after leaving.
    session.toggle_microphone();
    session.leave();
    session.toggle_camera();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let disconnects = fake.calls().into_iter().filter(|call| *call == Call::Disconnect).count();
    assert_eq!(disconnects, 1);
    assert!(!fake.calls().contains(&Call::SetMicrophoneEnabled(false)));
}

#[tokio::test]
async fn remote_tracks_attach_to_the_single_remote_element() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;
    let events = fake.events();

    let bob_video = remote_track("TR_bob_cam", "bob", TrackKind::Video);
    let bob_audio = remote_track("TR_bob_mic", "bob", TrackKind::Audio);
    events
        .send(RoomEvent::TrackSubscribed {
            track: bob_video.clone(),
        })
        .unwrap();
    events
        .send(RoomEvent::TrackSubscribed {
            track: bob_audio.clone(),
        })
        .unwrap();
    let state = wait_for(&session, |state| state.remote_media.audio.is_some()).await;
    assert_eq!(state.remote_media.video, Some(bob_video.clone()));
    assert_eq!(state.remote_media.audio, Some(bob_audio));

    // Unsubscribing leaves the element alone, a second participant overwrites it.
    let carol_video = remote_track("TR_carol_cam", "carol", TrackKind::Video);
    events.send(RoomEvent::TrackUnsubscribed { track: bob_video }).unwrap();
    events
        .send(RoomEvent::TrackSubscribed {
            track: carol_video.clone(),
        })
        .unwrap();
    let state = wait_for(&session, |state| {
        state.remote_media.video.as_ref().map(|t| t.participant.as_str()) == Some("carol")
    })
    .await;
    assert_eq!(state.remote_media.video, Some(carol_video));
    assert_eq!(state.local_media.video.as_ref().map(|t| t.sid.as_str()), Some("TR_camera"));
}

#[tokio::test]
async fn already_attached_tracks_are_not_reattached() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;
    let events = fake.events();

    // The local camera is already shown by the local element.
    let local_camera = session.state.borrow().local_media.video.clone().unwrap();
    events.send(RoomEvent::TrackSubscribed { track: local_camera }).unwrap();
    let marker = remote_track("TR_bob_mic", "bob", TrackKind::Audio);
    events
        .send(RoomEvent::TrackSubscribed { track: marker })
        .unwrap();

    let state = wait_for(&session, |state| state.remote_media.audio.is_some()).await;
    assert_eq!(state.remote_media.video, None);
}

#[tokio::test]
async fn room_events_update_the_status() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;
    let events = fake.events();

    events
        .send(RoomEvent::Disconnected {
            reason: "server shutdown".to_string(),
        })
        .unwrap();
    let state = wait_for(&session, |state| state.status == status::DISCONNECTED).await;
    assert!(!state.connected);

    events.send(RoomEvent::Connected).unwrap();
    let state = wait_for(&session, |state| state.status == status::connected("sala-1")).await;
    assert!(state.connected);
}

#[tokio::test]
async fn close_disconnects_and_stops_the_worker() {
    let fake = FakeConnector::new("sala-1");
    let session = connected(&fake).await;
    let observer = session.state.clone();

    tokio::time::timeout(Duration::from_secs(5), session.close())
        .await
        .expect("close timed out");

    assert!(!observer.borrow().running);
    assert_eq!(fake.calls().last(), Some(&Call::Disconnect));
}

#[tokio::test]
async fn configured_options_reach_the_backend() {
    let fake = FakeConnector::new("sala-1");
    let mut config = config(Some("token-1"));
    config.adaptive_stream = false;
    config.video_preset = VideoPreset::H540;
    let session = RoomSession::spawn(fake.clone(), config);
    wait_for(&session, |state| state.status == status::connected("sala-1")).await;

    let calls = fake.calls();
    assert!(matches!(
        &calls[0],
        Call::Connect {
            options: RoomOptions {
                adaptive_stream: false,
                dynacast: true
            },
            ..
        }
    ));
    assert_eq!(
        calls[1],
        Call::CreateLocalTracks(CaptureOptions {
            audio: true,
            video: Some(VideoPreset::H540),
        })
    );
    assert_eq!(session.state.borrow().local_media.video.as_ref().unwrap().label, "960x540");
}
