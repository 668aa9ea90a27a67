use crate::model::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Ended,
}

/// Запись о комнате. После перехода в `Ended` обратно не возвращается.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub creator: ParticipantId,
    pub duration_minutes: u32,
    pub status: RoomStatus,
    pub created_at: SystemTime,
    pub ended_at: Option<SystemTime>,
}

impl Room {
    pub fn new(creator: ParticipantId, duration_minutes: u32) -> Self {
        Self {
            id: RoomId::new(),
            creator,
            duration_minutes,
            status: RoomStatus::Active,
            created_at: SystemTime::now(),
            ended_at: None,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_minutes) * 60)
    }

    pub fn is_active(&self) -> bool {
        self.status == RoomStatus::Active
    }
}
