use async_trait::async_trait;
use parley_core::model::{ParticipantId, Role, RoomId, SignalEnvelope, SignalPayload};
use parley_session::{
    Mailbox, MemoryRelay, NegotiationState, RelayError, SessionError, SignalSubscription,
    SignalingCoordinator,
};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::integration::signaling_tests::offer_payload;
use crate::utils::{MockTransport, TransportCall};

#[tokio::test]
async fn test_empty_log_makes_initiator() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let me = ParticipantId::new();
    let transport = MockTransport::new("a");

    let mut coordinator =
        SignalingCoordinator::new(room_id.clone(), me.clone(), relay.clone(), transport.clone());
    let (role, _subscription) = coordinator.begin(None).await.expect("Join failed");

    assert_eq!(role, Role::Initiator);
    assert_eq!(coordinator.state(), NegotiationState::Offering);
    assert_eq!(transport.offers_created(), 1);

    // Exactly one message in the log, and it is our offer.
    let history = relay.history(&room_id).await.expect("History failed");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender, me);
    assert!(matches!(history[0].payload, SignalPayload::Offer { .. }));
}

#[tokio::test]
async fn test_prior_messages_make_responder() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let peer = ParticipantId::new();
    let me = ParticipantId::new();
    let transport = MockTransport::new("b");

    relay
        .append(&room_id, &peer, offer_payload("v=0 offer-from-peer"))
        .await
        .expect("Append failed");

    let mut coordinator =
        SignalingCoordinator::new(room_id.clone(), me.clone(), relay.clone(), transport.clone());
    let (role, _subscription) = coordinator.begin(None).await.expect("Join failed");

    assert_eq!(role, Role::Responder);
    // The recorded offer is replayed through the handler: remote description
    // applied, answer created and published.
    assert_eq!(coordinator.state(), NegotiationState::Negotiating);
    assert_eq!(transport.offers_created(), 0);
    assert!(transport.calls().contains(&TransportCall::CreateAnswer));

    let history = relay.history(&room_id).await.expect("History failed");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].sender, me);
    assert!(matches!(history[1].payload, SignalPayload::Answer { .. }));
}

#[tokio::test]
async fn test_assigned_role_overrides_probe() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let me = ParticipantId::new();
    let transport = MockTransport::new("c");

    // An assigned responder never offers, even when the log is empty.
    let mut coordinator =
        SignalingCoordinator::new(room_id.clone(), me.clone(), relay.clone(), transport.clone());
    let (role, _subscription) = coordinator
        .begin(Some(Role::Responder))
        .await
        .expect("Join failed");

    assert_eq!(role, Role::Responder);
    assert_eq!(coordinator.state(), NegotiationState::Answering);
    assert_eq!(transport.offers_created(), 0);
    assert!(
        relay
            .history(&room_id)
            .await
            .expect("History failed")
            .is_empty()
    );
}

/// A mailbox that reads fine but refuses every write.
struct DeadLetterOutbox {
    inner: Arc<MemoryRelay>,
}

#[async_trait]
impl Mailbox for DeadLetterOutbox {
    async fn append(
        &self,
        _room_id: &RoomId,
        _sender: &ParticipantId,
        _payload: SignalPayload,
    ) -> Result<SignalEnvelope, RelayError> {
        Err(RelayError::Unavailable("append refused".to_owned()))
    }

    async fn history(&self, room_id: &RoomId) -> Result<Vec<SignalEnvelope>, RelayError> {
        self.inner.history(room_id).await
    }

    async fn subscribe(&self, room_id: &RoomId) -> Result<SignalSubscription, RelayError> {
        self.inner.subscribe(room_id).await
    }
}

#[tokio::test]
async fn test_responder_join_fails_when_answer_cannot_be_published() {
    init_tracing();

    let relay = Arc::new(MemoryRelay::new());
    let room_id = RoomId::new();
    let peer = ParticipantId::new();
    let me = ParticipantId::new();
    let transport = MockTransport::new("b");

    relay
        .append(&room_id, &peer, offer_payload("v=0 offer-from-peer"))
        .await
        .expect("Append failed");

    let mut coordinator = SignalingCoordinator::new(
        room_id.clone(),
        me.clone(),
        Arc::new(DeadLetterOutbox {
            inner: relay.clone(),
        }),
        transport.clone(),
    );

    // The backlog replay cannot publish the answer, so the join itself fails
    // instead of reporting a half-dead handshake as established.
    let err = match coordinator.begin(Some(Role::Responder)).await {
        Ok(_) => panic!("Join must fail when the answer is not published"),
        Err(e) => e,
    };
    assert!(matches!(err, SessionError::Relay(_)));
    assert_ne!(coordinator.state(), NegotiationState::Negotiating);

    // The log still holds only the peer's offer.
    let history = relay.history(&room_id).await.expect("History failed");
    assert_eq!(history.len(), 1);
    assert!(matches!(history[0].payload, SignalPayload::Offer { .. }));
}
