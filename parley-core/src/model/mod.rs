mod participant;
mod request;
mod role;
mod room;
mod sdp;
mod signal;
mod track;

pub use participant::ParticipantId;
pub use request::RequestId;
pub use role::Role;
pub use room::{Room, RoomId, RoomStatus};
pub use sdp::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
pub use signal::{SignalEnvelope, SignalId, SignalPayload};
pub use track::TrackKind;
