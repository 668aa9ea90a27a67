use parley_core::model::RoomId;
use parley_session::{MemoryRelay, RoomLifecycle, SessionError};
use std::sync::Arc;

use crate::integration::{create_test_room, init_tracing};

#[tokio::test]
async fn test_load_room_returns_active_room() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, _) = create_test_room(&relay, 30).await;

    let lifecycle = RoomLifecycle::new(relay.clone());
    let loaded = lifecycle.load_room(&room.id).await.expect("Room should load");
    assert_eq!(loaded.id, room.id);
    assert!(loaded.is_active());
}

#[tokio::test]
async fn test_load_unknown_room_fails() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let lifecycle = RoomLifecycle::new(relay.clone());

    let missing = RoomId::new();
    let err = lifecycle
        .load_room(&missing)
        .await
        .expect_err("Unknown room should not load");
    assert!(matches!(err, SessionError::RoomNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_load_ended_room_fails() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let (room, _) = create_test_room(&relay, 10).await;

    let lifecycle = RoomLifecycle::new(relay.clone());
    lifecycle.end_room(&room.id).await.expect("Failed to end room");

    let err = lifecycle
        .load_room(&room.id)
        .await
        .expect_err("Ended room should not load");
    assert!(matches!(err, SessionError::RoomNotActive(id) if id == room.id));
}
