use crate::transport::TransportConfig;
use parley_core::model::{ParticipantId, Role, RoomId};

/// Параметры входа в комнату.
#[derive(Clone)]
pub struct SessionConfig {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,

    /// Роль, назначенная заранее: создатель комнаты входит инициатором.
    /// `None` — роль выводится из журнала комнаты при входе.
    pub role: Option<Role>,

    pub transport: TransportConfig,
}

impl SessionConfig {
    pub fn new(room_id: RoomId, participant_id: ParticipantId) -> Self {
        Self {
            room_id,
            participant_id,
            role: None,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}
