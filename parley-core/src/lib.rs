pub mod model;

pub use model::{ParticipantId, Role, RoomId, SignalId};
