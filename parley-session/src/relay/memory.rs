use crate::error::RelayError;
use crate::relay::mailbox::{Mailbox, SignalSubscription};
use crate::relay::store::{EndTransition, RoomStore};
use async_trait::async_trait;
use dashmap::DashMap;
use parley_core::model::{
    ParticipantId, Room, RoomId, RoomStatus, SignalEnvelope, SignalId, SignalPayload,
};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Default)]
struct RoomLog {
    next_id: u64,
    entries: Vec<SignalEnvelope>,
    subscribers: Vec<mpsc::UnboundedSender<SignalEnvelope>>,
}

/// Реле в памяти процесса: записи комнат и журналы сигналов без внешнего
/// хранилища. Работает и встраиваемо, и как состояние ws-реле.
#[derive(Default)]
pub struct MemoryRelay {
    rooms: DashMap<RoomId, Room>,
    logs: DashMap<RoomId, RoomLog>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Mailbox for MemoryRelay {
    async fn append(
        &self,
        room_id: &RoomId,
        sender: &ParticipantId,
        payload: SignalPayload,
    ) -> Result<SignalEnvelope, RelayError> {
        let mut log = self.logs.entry(room_id.clone()).or_default();
        let envelope = SignalEnvelope {
            id: SignalId(log.next_id),
            room_id: room_id.clone(),
            sender: sender.clone(),
            payload,
        };
        log.next_id += 1;
        log.entries.push(envelope.clone());
        // Закрытые подписки вычищаются по факту неудачной отправки.
        log.subscribers
            .retain(|tx| tx.send(envelope.clone()).is_ok());
        Ok(envelope)
    }

    async fn history(&self, room_id: &RoomId) -> Result<Vec<SignalEnvelope>, RelayError> {
        Ok(self
            .logs
            .get(room_id)
            .map(|log| log.entries.clone())
            .unwrap_or_default())
    }

    async fn subscribe(&self, room_id: &RoomId) -> Result<SignalSubscription, RelayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.logs
            .entry(room_id.clone())
            .or_default()
            .subscribers
            .push(tx);
        debug!("New mailbox subscription for room {}", room_id);
        Ok(SignalSubscription::new(room_id.clone(), rx))
    }
}

#[async_trait]
impl RoomStore for MemoryRelay {
    async fn insert_room(
        &self,
        creator: &ParticipantId,
        duration_minutes: u32,
    ) -> Result<Room, RelayError> {
        let room = Room::new(creator.clone(), duration_minutes);
        self.rooms.insert(room.id.clone(), room.clone());
        debug!("Inserted room {} ({} min)", room.id, duration_minutes);
        Ok(room)
    }

    async fn fetch_room(&self, room_id: &RoomId) -> Result<Option<Room>, RelayError> {
        Ok(self.rooms.get(room_id).map(|room| room.clone()))
    }

    async fn end_room(
        &self,
        room_id: &RoomId,
        ended_at: SystemTime,
    ) -> Result<Option<EndTransition>, RelayError> {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return Ok(None);
        };
        if room.status == RoomStatus::Ended {
            return Ok(Some(EndTransition::AlreadyEnded(room.clone())));
        }
        room.status = RoomStatus::Ended;
        room.ended_at = Some(ended_at);
        Ok(Some(EndTransition::Ended(room.clone())))
    }
}
