use crate::media::RemoteTrack;
use parley_core::model::IceCandidate;

/// Состояние peer connection без привязки к типам webrtc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    CandidateGenerated(IceCandidate),
    RemoteTrack(RemoteTrack),
    ConnectionStateChanged(PeerConnectionState),
}
