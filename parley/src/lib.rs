pub use parley_core::model::{ParticipantId, RoomId};

pub mod model {
    pub use parley_core::model::*;
}

#[cfg(feature = "session")]
pub mod session {
    pub use parley_session::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use parley_relay::*;
}
