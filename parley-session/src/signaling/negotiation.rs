/// Фазы переговоров между двумя участниками комнаты.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// Сессия создана, обмен еще не начат.
    Idle,

    /// Подписка оформлена, роль еще не определена.
    RoleUndetermined,

    /// Локальный Offer опубликован, ждем Answer.
    Offering,

    /// Ждем или обрабатываем удаленный Offer.
    Answering,

    /// Offer и Answer применены, идет обмен кандидатами.
    Negotiating,

    /// Пришла удаленная дорожка, звонок установлен.
    Connected,

    /// Сессия завершена. Из этого состояния выхода нет.
    Closed,
}

impl NegotiationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Closed)
    }
}
