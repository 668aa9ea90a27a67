use crate::error::SessionError;
use crate::relay::{EndTransition, RoomStore};
use parley_core::model::{ParticipantId, Room, RoomId};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Жизненный цикл комнаты поверх хранилища: создание, загрузка для входа,
/// идемпотентное завершение и таймер принудительного конца.
#[derive(Clone)]
pub struct RoomLifecycle {
    store: Arc<dyn RoomStore>,
}

impl RoomLifecycle {
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    pub async fn create_room(
        &self,
        creator: &ParticipantId,
        duration_minutes: u32,
    ) -> Result<Room, SessionError> {
        if duration_minutes == 0 {
            return Err(SessionError::InvalidDuration(duration_minutes));
        }
        let room = self.store.insert_room(creator, duration_minutes).await?;
        info!("Created room {} for {} minutes", room.id, duration_minutes);
        Ok(room)
    }

    /// Загрузка комнаты перед входом: комната должна существовать и быть
    /// активной.
    pub async fn load_room(&self, room_id: &RoomId) -> Result<Room, SessionError> {
        let room = self
            .store
            .fetch_room(room_id)
            .await?
            .ok_or_else(|| SessionError::RoomNotFound(room_id.clone()))?;
        if !room.is_active() {
            return Err(SessionError::RoomNotActive(room_id.clone()));
        }
        Ok(room)
    }

    /// Идемпотентное завершение: повторный вызов возвращает уже
    /// завершенную запись, не меняя `ended_at`.
    pub async fn end_room(&self, room_id: &RoomId) -> Result<Room, SessionError> {
        let transition = self
            .store
            .end_room(room_id, SystemTime::now())
            .await?
            .ok_or_else(|| SessionError::RoomNotFound(room_id.clone()))?;
        match &transition {
            EndTransition::Ended(room) => info!("Room {} ended", room.id),
            EndTransition::AlreadyEnded(room) => debug!("Room {} was already ended", room.id),
        }
        Ok(transition.into_room())
    }

    /// Взвести одноразовый таймер: по истечении срока комната завершается
    /// и в возвращенный канал уходит сигнал. Guard отменяет таймер явно
    /// или при сбросе.
    pub fn schedule_auto_end(
        &self,
        room_id: RoomId,
        after: Duration,
    ) -> (AutoEndGuard, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let lifecycle = self.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            info!("Room {} reached its time limit", room_id);
            if let Err(e) = lifecycle.end_room(&room_id).await {
                warn!("Auto-end for room {} failed: {}", room_id, e);
            }
            let _ = tx.send(());
        });

        (AutoEndGuard { handle }, rx)
    }
}

/// Ручка таймера принудительного завершения.
pub struct AutoEndGuard {
    handle: JoinHandle<()>,
}

impl AutoEndGuard {
    /// Отменить таймер. Вызов после срабатывания безвреден.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for AutoEndGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
