pub mod test_role_resolution;
pub mod test_self_and_duplicate_filtering;

use parley_core::model::{
    IceCandidate, ParticipantId, RoomId, SignalEnvelope, SignalId, SignalPayload,
};

/// Build a mailbox envelope without going through a relay. Ids start high so
/// they never collide with relay-assigned ones in the same test.
pub fn envelope(
    id: u64,
    room_id: &RoomId,
    sender: &ParticipantId,
    payload: SignalPayload,
) -> SignalEnvelope {
    SignalEnvelope {
        id: SignalId(id),
        room_id: room_id.clone(),
        sender: sender.clone(),
        payload,
    }
}

pub fn offer_payload(sdp: &str) -> SignalPayload {
    SignalPayload::Offer {
        sdp: sdp.to_owned(),
    }
}

pub fn answer_payload(sdp: &str) -> SignalPayload {
    SignalPayload::Answer {
        sdp: sdp.to_owned(),
    }
}

pub fn candidate_payload(n: u32) -> SignalPayload {
    SignalPayload::from(test_candidate(n))
}

pub fn test_candidate(n: u32) -> IceCandidate {
    IceCandidate {
        candidate: format!("candidate:{n} 1 udp 1 127.0.0.1 4444 typ host"),
        sdp_mid: Some("0".to_owned()),
        sdp_m_line_index: Some(0),
    }
}
