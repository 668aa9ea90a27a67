use crate::error::RelayError;
use async_trait::async_trait;
use parley_core::model::{ParticipantId, RoomId, SignalEnvelope, SignalPayload};
use tokio::sync::mpsc;

/// Трейт почтового ящика: упорядоченный журнал сигналов комнаты.
/// Реализация обязана выдавать конверты с возрастающими `id` в порядке
/// записи и доставлять подписчикам каждый сигнал как минимум один раз.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Дописать сигнал в журнал комнаты.
    async fn append(
        &self,
        room_id: &RoomId,
        sender: &ParticipantId,
        payload: SignalPayload,
    ) -> Result<SignalEnvelope, RelayError>;

    /// Прочитать накопленный журнал комнаты в порядке записи.
    async fn history(&self, room_id: &RoomId) -> Result<Vec<SignalEnvelope>, RelayError>;

    /// Подписаться на новые сигналы комнаты. Ранее записанный журнал
    /// подписка не повторяет, его забирают через `history`.
    async fn subscribe(&self, room_id: &RoomId) -> Result<SignalSubscription, RelayError>;
}

/// Поток новых сигналов комнаты. Сброс значения отписывает и
/// останавливает дальнейшую доставку.
pub struct SignalSubscription {
    room_id: RoomId,
    rx: mpsc::UnboundedReceiver<SignalEnvelope>,
}

impl SignalSubscription {
    pub fn new(room_id: RoomId, rx: mpsc::UnboundedReceiver<SignalEnvelope>) -> Self {
        Self { room_id, rx }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Следующий сигнал. `None` означает, что источник закрыт.
    pub async fn recv(&mut self) -> Option<SignalEnvelope> {
        self.rx.recv().await
    }
}
