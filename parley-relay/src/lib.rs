pub mod client;
pub mod protocol;
pub mod server;

pub use client::RemoteRelay;
pub use protocol::{ClientFrame, ServerFrame};
pub use server::{RelayState, router};
