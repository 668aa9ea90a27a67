use crate::error::TransportError;
use crate::media::LocalTrack;
use async_trait::async_trait;
use parley_core::model::{IceCandidate, SessionDescription, TrackKind};
use std::sync::Arc;

/// Трейт транспорта между двумя участниками. Реализация обязана отдавать
/// `TransportEvent` в канал, переданный ей при создании.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Создать SDP Offer и установить его как LocalDescription.
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    /// Создать SDP Answer и установить его как LocalDescription.
    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    /// Применить удаленный SDP (Offer или Answer).
    async fn set_remote_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    /// Добавить удаленного ICE-кандидата (Trickle ICE).
    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    /// Добавить локальную дорожку в соединение.
    async fn add_local_track(&self, track: Arc<LocalTrack>) -> Result<(), TransportError>;

    /// Подменить исходящую дорожку данного вида без повторных переговоров.
    async fn replace_track(
        &self,
        kind: TrackKind,
        track: Arc<LocalTrack>,
    ) -> Result<(), TransportError>;

    /// Закрыть соединение.
    async fn close(&self) -> Result<(), TransportError>;
}
