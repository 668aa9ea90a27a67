pub mod error;
pub mod media;
pub mod relay;
pub mod room;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::{MediaError, RelayError, SessionError, TransportError};
pub use media::{LocalMedia, LocalTrack, MediaDevices, RemoteTrack, SampleMediaDevices};
pub use relay::{EndTransition, Mailbox, MemoryRelay, RoomStore, SignalSubscription};
pub use room::{AutoEndGuard, RoomLifecycle};
pub use session::{
    EndReason, Session, SessionCommand, SessionConfig, SessionEvent, SessionHandle,
};
pub use signaling::{NegotiationState, SignalingCoordinator};
pub use transport::{
    PeerConnectionState, PeerTransport, TransportConfig, TransportEvent, WebRtcTransport,
};
