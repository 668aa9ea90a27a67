use crate::error::RelayError;
use async_trait::async_trait;
use parley_core::model::{ParticipantId, Room, RoomId};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Итог попытки завершить комнату.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "room", rename_all = "snake_case")]
pub enum EndTransition {
    /// Комната была активна и переведена в `Ended`.
    Ended(Room),

    /// Комната уже была завершена, запись не изменилась.
    AlreadyEnded(Room),
}

impl EndTransition {
    pub fn room(&self) -> &Room {
        match self {
            EndTransition::Ended(room) | EndTransition::AlreadyEnded(room) => room,
        }
    }

    pub fn into_room(self) -> Room {
        match self {
            EndTransition::Ended(room) | EndTransition::AlreadyEnded(room) => room,
        }
    }
}

/// Хранилище записей о комнатах.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Создать комнату со статусом `Active`.
    async fn insert_room(
        &self,
        creator: &ParticipantId,
        duration_minutes: u32,
    ) -> Result<Room, RelayError>;

    /// Найти комнату по идентификатору.
    async fn fetch_room(&self, room_id: &RoomId) -> Result<Option<Room>, RelayError>;

    /// Перевести комнату в `Ended`, если она ещё активна. Для уже
    /// завершенной комнаты ни статус, ни `ended_at` не меняются.
    /// `None` — комнаты нет в хранилище.
    async fn end_room(
        &self,
        room_id: &RoomId,
        ended_at: SystemTime,
    ) -> Result<Option<EndTransition>, RelayError>;
}
