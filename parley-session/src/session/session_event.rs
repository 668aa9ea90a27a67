use crate::media::RemoteTrack;
use crate::signaling::NegotiationState;
use parley_core::model::Role;

/// Причина завершения сессии.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Локальный участник завершил звонок.
    Local,

    /// Комната исчерпала отведенное время.
    Timeout,
}

/// События сессии для пользовательского интерфейса.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Вход выполнен, роль определена.
    Joined { role: Role },

    /// Пришла дорожка удаленного участника.
    RemoteMedia(RemoteTrack),

    /// Сменилась фаза переговоров.
    StateChanged(NegotiationState),

    /// Показ экрана начался или закончился.
    ScreenShare { active: bool },

    /// Транспорт сообщил о деградации соединения. Сессию это не завершает.
    ConnectionLost,

    /// Сессия завершена. Последнее событие.
    Ended { reason: EndReason },
}
