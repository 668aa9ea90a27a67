use parley_core::model::{RoomId, TrackKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay unavailable: {0}")]
    Unavailable(String),

    #[error("relay connection closed")]
    ConnectionClosed,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media capture denied: {0}")]
    AcquisitionDenied(String),

    #[error("failed to write media sample: {0}")]
    SampleWrite(webrtc::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("peer connection setup failed: {0}")]
    Setup(webrtc::Error),

    #[error("failed to create local description: {0}")]
    CreateDescription(webrtc::Error),

    #[error("failed to apply remote description: {0}")]
    ApplyDescription(webrtc::Error),

    #[error("failed to apply remote ICE candidate: {0}")]
    ApplyCandidate(webrtc::Error),

    #[error("failed to attach local track: {0}")]
    AttachTrack(webrtc::Error),

    #[error("no active {0} sender to replace")]
    MissingSender(TrackKind),

    #[error("failed to close peer connection: {0}")]
    Close(webrtc::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    #[error("room {0} is no longer active")]
    RoomNotActive(RoomId),

    #[error("invalid room duration: {0} minutes")]
    InvalidDuration(u32),

    #[error("signaling relay failure: {0}")]
    Relay(#[from] RelayError),

    #[error("local media failure: {0}")]
    Media(#[from] MediaError),

    #[error("peer transport failure: {0}")]
    Transport(#[from] TransportError),
}
