mod coordinator;
mod negotiation;

pub use coordinator::*;
pub use negotiation::*;
