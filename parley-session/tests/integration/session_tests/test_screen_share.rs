use parley_core::model::{Role, TrackKind};
use parley_session::{MemoryRelay, SessionEvent};
use std::sync::Arc;

use crate::integration::{create_test_room, init_tracing, join_test_room};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_event, wait_until};

#[tokio::test]
async fn test_screen_share_round_trip_restores_camera() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, creator) = create_test_room(&relay, 30).await;
    let mut participant =
        join_test_room(&relay, &room.id, &creator, Some(Role::Initiator), "a").await;

    // Mute first so the round trip can prove audio enablement is untouched.
    let audio = participant.devices.media().audio.clone();
    participant.handle.toggle_mute().await;
    assert!(wait_until(|| !audio.is_enabled(), EVENT_TIMEOUT_MS).await);

    participant.handle.start_screen_share().await;
    wait_for_event(&mut participant.handle, |e| {
        matches!(e, SessionEvent::ScreenShare { active: true })
    })
    .await;
    assert_eq!(
        participant.transport.replaced_tracks(),
        vec![(TrackKind::Video, "screen".to_owned())]
    );

    participant.handle.stop_screen_share().await;
    wait_for_event(&mut participant.handle, |e| {
        matches!(e, SessionEvent::ScreenShare { active: false })
    })
    .await;
    assert_eq!(
        participant.transport.replaced_tracks(),
        vec![
            (TrackKind::Video, "screen".to_owned()),
            (TrackKind::Video, "camera".to_owned()),
        ]
    );

    // The retired screen track is marked ended; audio is still muted.
    assert!(participant.devices.screens()[0].has_ended());
    assert!(!audio.is_enabled());
    assert!(participant.devices.media().video.is_enabled());
}

#[tokio::test]
async fn test_revoked_screen_capture_falls_back_to_camera() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, creator) = create_test_room(&relay, 30).await;
    let mut participant =
        join_test_room(&relay, &room.id, &creator, Some(Role::Initiator), "a").await;

    participant.handle.start_screen_share().await;
    wait_for_event(&mut participant.handle, |e| {
        matches!(e, SessionEvent::ScreenShare { active: true })
    })
    .await;

    // The platform revokes the capture out from under the session.
    participant.devices.screens()[0].mark_ended();

    wait_for_event(&mut participant.handle, |e| {
        matches!(e, SessionEvent::ScreenShare { active: false })
    })
    .await;
    let replaced = participant.transport.replaced_tracks();
    assert_eq!(replaced.last(), Some(&(TrackKind::Video, "camera".to_owned())));
}

#[tokio::test]
async fn test_denied_screen_capture_is_not_fatal() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, creator) = create_test_room(&relay, 30).await;
    let participant =
        join_test_room(&relay, &room.id, &creator, Some(Role::Initiator), "a").await;

    participant.devices.deny_display_media();
    participant.handle.start_screen_share().await;

    // Share never starts; the call keeps running on the camera track.
    let started = wait_until(
        || !participant.transport.replaced_tracks().is_empty(),
        200,
    )
    .await;
    assert!(!started, "Denied capture must not swap tracks");
    assert!(!participant.transport.is_closed());
}
