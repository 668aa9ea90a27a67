use parley_core::model::{ParticipantId, RequestId, Room, RoomId, SignalEnvelope, SignalPayload};
use parley_session::EndTransition;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Кадры от клиента к реле.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientFrame {
    CreateRoom {
        req_id: RequestId,
        creator: ParticipantId,
        duration_minutes: u32,
    },
    FetchRoom {
        req_id: RequestId,
        room_id: RoomId,
    },
    EndRoom {
        req_id: RequestId,
        room_id: RoomId,
        ended_at: SystemTime,
    },
    Append {
        req_id: RequestId,
        room_id: RoomId,
        sender: ParticipantId,
        payload: SignalPayload,
    },
    History {
        req_id: RequestId,
        room_id: RoomId,
    },
    Subscribe {
        req_id: RequestId,
        room_id: RoomId,
    },
}

impl ClientFrame {
    pub fn request_id(&self) -> &RequestId {
        match self {
            ClientFrame::CreateRoom { req_id, .. }
            | ClientFrame::FetchRoom { req_id, .. }
            | ClientFrame::EndRoom { req_id, .. }
            | ClientFrame::Append { req_id, .. }
            | ClientFrame::History { req_id, .. }
            | ClientFrame::Subscribe { req_id, .. } => req_id,
        }
    }
}

/// Кадры от реле к клиенту. `Delivery` приходит без запроса, в рамках
/// оформленной подписки.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerFrame {
    RoomCreated {
        req_id: RequestId,
        room: Room,
    },
    RoomFetched {
        req_id: RequestId,
        room: Option<Room>,
    },
    RoomEnded {
        req_id: RequestId,
        transition: Option<EndTransition>,
    },
    Appended {
        req_id: RequestId,
        envelope: SignalEnvelope,
    },
    HistorySnapshot {
        req_id: RequestId,
        entries: Vec<SignalEnvelope>,
    },
    Subscribed {
        req_id: RequestId,
    },
    Delivery {
        envelope: SignalEnvelope,
    },
    Error {
        req_id: Option<RequestId>,
        message: String,
    },
}

impl ServerFrame {
    /// Идентификатор запроса, на который отвечает кадр.
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            ServerFrame::RoomCreated { req_id, .. }
            | ServerFrame::RoomFetched { req_id, .. }
            | ServerFrame::RoomEnded { req_id, .. }
            | ServerFrame::Appended { req_id, .. }
            | ServerFrame::HistorySnapshot { req_id, .. }
            | ServerFrame::Subscribed { req_id } => Some(req_id),
            ServerFrame::Error { req_id, .. } => req_id.as_ref(),
            ServerFrame::Delivery { .. } => None,
        }
    }
}
