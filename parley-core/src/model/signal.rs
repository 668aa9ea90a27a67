use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use crate::model::sdp::{IceCandidate, SdpKind, SessionDescription};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Порядковый номер сообщения внутри комнаты. Выдаётся почтовым ящиком,
/// строго возрастает в порядке записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId(pub u64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SignalPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}

impl SignalPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalPayload::Offer { .. } => "offer",
            SignalPayload::Answer { .. } => "answer",
            SignalPayload::IceCandidate { .. } => "ice-candidate",
        }
    }
}

impl From<SessionDescription> for SignalPayload {
    fn from(desc: SessionDescription) -> Self {
        match desc.kind {
            SdpKind::Offer => SignalPayload::Offer { sdp: desc.sdp },
            SdpKind::Answer => SignalPayload::Answer { sdp: desc.sdp },
        }
    }
}

impl From<IceCandidate> for SignalPayload {
    fn from(candidate: IceCandidate) -> Self {
        SignalPayload::IceCandidate {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_m_line_index: candidate.sdp_m_line_index,
        }
    }
}

/// Запись почтового ящика: полезная нагрузка плюс метки отправителя и комнаты.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEnvelope {
    pub id: SignalId,
    pub room_id: RoomId,
    pub sender: ParticipantId,
    pub payload: SignalPayload,
}
