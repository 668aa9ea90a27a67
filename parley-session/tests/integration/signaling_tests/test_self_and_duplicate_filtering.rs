use parley_core::model::{ParticipantId, RoomId, SdpKind};
use parley_session::{MemoryRelay, NegotiationState, SignalingCoordinator};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::integration::signaling_tests::{answer_payload, envelope, offer_payload};
use crate::utils::MockTransport;

#[tokio::test]
async fn test_own_signals_are_never_applied() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let me = ParticipantId::new();
    let transport = MockTransport::new("a");

    let mut coordinator =
        SignalingCoordinator::new(room_id.clone(), me.clone(), relay.clone(), transport.clone());
    let (_role, mut subscription) = coordinator.begin(None).await.expect("Join failed");
    let calls_after_join = transport.call_count();

    // The initiator's own offer comes back through its live subscription.
    let echoed = subscription
        .recv()
        .await
        .expect("Own offer should be delivered");
    assert_eq!(echoed.sender, me);
    coordinator.handle_signal(echoed).await
        .expect("Signal handling failed");

    // An offer forged with our own sender id must be dropped too.
    coordinator
        .handle_signal(envelope(100, &room_id, &me, offer_payload("v=0 self")))
        .await
        .expect("Signal handling failed");

    assert_eq!(transport.call_count(), calls_after_join);
    assert_eq!(coordinator.state(), NegotiationState::Offering);
}

#[tokio::test]
async fn test_replayed_signal_id_is_ignored() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let me = ParticipantId::new();
    let peer = ParticipantId::new();
    let transport = MockTransport::new("a");

    let mut coordinator =
        SignalingCoordinator::new(room_id.clone(), me.clone(), relay.clone(), transport.clone());
    coordinator.begin(None).await.expect("Join failed");

    let answer = envelope(100, &room_id, &peer, answer_payload("v=0 answer"));
    coordinator.handle_signal(answer.clone()).await
        .expect("Signal handling failed");
    assert_eq!(coordinator.state(), NegotiationState::Negotiating);

    // At-least-once delivery from the mailbox: the same envelope again.
    coordinator.handle_signal(answer).await
        .expect("Signal handling failed");

    let remotes = transport.remote_descriptions();
    assert_eq!(remotes.len(), 1);
    assert_eq!(remotes[0].0, SdpKind::Answer);
}
