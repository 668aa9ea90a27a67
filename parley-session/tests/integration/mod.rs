pub mod lifecycle_tests;
pub mod session_tests;
pub mod signaling_tests;

use parley_session::{
    MemoryRelay, RoomLifecycle, Session, SessionConfig, SessionHandle, TransportEvent,
};
use parley_core::model::{ParticipantId, Role, Room, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{MockDevices, MockTransport};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Insert an active room and return it together with its creator id.
pub async fn create_test_room(
    relay: &Arc<MemoryRelay>,
    duration_minutes: u32,
) -> (Room, ParticipantId) {
    let creator = ParticipantId::new();
    let lifecycle = RoomLifecycle::new(relay.clone());
    let room = lifecycle
        .create_room(&creator, duration_minutes)
        .await
        .expect("Failed to create room");
    (room, creator)
}

/// Everything a test needs to drive one participant of a call.
pub struct TestParticipant {
    pub handle: SessionHandle,
    pub transport: Arc<MockTransport>,
    pub devices: Arc<MockDevices>,
    /// Injecting into this channel simulates events from the peer connection.
    pub transport_tx: mpsc::Sender<TransportEvent>,
}

/// Start a session over the shared in-memory relay with mock transport and
/// devices.
pub async fn join_test_room(
    relay: &Arc<MemoryRelay>,
    room_id: &RoomId,
    participant: &ParticipantId,
    role: Option<Role>,
    name: &str,
) -> TestParticipant {
    let transport = MockTransport::new(name);
    let devices = MockDevices::new();
    let (transport_tx, transport_rx) = mpsc::channel(256);

    let mut config = SessionConfig::new(room_id.clone(), participant.clone());
    config.role = role;

    let handle = Session::start_with_transport(
        config,
        relay.clone(),
        relay.clone(),
        devices.clone(),
        transport.clone(),
        transport_rx,
    )
    .await
    .expect("Failed to start session");

    TestParticipant {
        handle,
        transport,
        devices,
        transport_tx,
    }
}
