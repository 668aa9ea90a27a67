use parley_core::model::RoomStatus;
use parley_session::{EndTransition, MemoryRelay, RoomLifecycle, RoomStore};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::integration::{create_test_room, init_tracing};

#[tokio::test]
async fn test_end_room_twice_keeps_first_ended_at() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, _) = create_test_room(&relay, 10).await;
    let lifecycle = RoomLifecycle::new(relay.clone());

    let first = lifecycle.end_room(&room.id).await.expect("First end failed");
    assert_eq!(first.status, RoomStatus::Ended);
    let first_ended_at = first.ended_at.expect("ended_at must be set");

    let second = lifecycle
        .end_room(&room.id)
        .await
        .expect("Second end failed");
    assert_eq!(second.status, RoomStatus::Ended);
    assert_eq!(second.ended_at, Some(first_ended_at));
}

#[tokio::test]
async fn test_late_end_does_not_overwrite_timestamp() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, _) = create_test_room(&relay, 10).await;

    let first_at = SystemTime::now();
    let transition = relay
        .end_room(&room.id, first_at)
        .await
        .expect("Store failure")
        .expect("Room must exist");
    assert!(matches!(transition, EndTransition::Ended(_)));

    // A timer firing long after an explicit end must observe the original
    // terminal state untouched.
    let later = first_at + Duration::from_secs(600);
    let transition = relay
        .end_room(&room.id, later)
        .await
        .expect("Store failure")
        .expect("Room must exist");
    match transition {
        EndTransition::AlreadyEnded(room) => {
            assert_eq!(room.status, RoomStatus::Ended);
            assert_eq!(room.ended_at, Some(first_at));
        }
        EndTransition::Ended(_) => panic!("Second end must be a no-op"),
    }
}
