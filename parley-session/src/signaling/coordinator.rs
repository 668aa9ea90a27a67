use crate::error::SessionError;
use crate::relay::{Mailbox, SignalSubscription};
use crate::signaling::negotiation::NegotiationState;
use crate::transport::PeerTransport;
use parley_core::model::{
    IceCandidate, ParticipantId, Role, RoomId, SessionDescription, SignalEnvelope, SignalId,
    SignalPayload,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Переговоры одной сессии: чтение журнала, определение роли, применение
/// входящих сигналов к транспорту и публикация исходящих.
pub struct SignalingCoordinator {
    room_id: RoomId,
    local_id: ParticipantId,
    mailbox: Arc<dyn Mailbox>,
    transport: Arc<dyn PeerTransport>,
    state: NegotiationState,
    role: Option<Role>,
    seen: HashSet<SignalId>,
    pending_candidates: Vec<IceCandidate>,
    have_remote_description: bool,
    offer_applied: bool,
    answer_applied: bool,
}

impl SignalingCoordinator {
    pub fn new(
        room_id: RoomId,
        local_id: ParticipantId,
        mailbox: Arc<dyn Mailbox>,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        Self {
            room_id,
            local_id,
            mailbox,
            transport,
            state: NegotiationState::Idle,
            role: None,
            seen: HashSet::new(),
            pending_candidates: Vec::new(),
            have_remote_description: false,
            offer_applied: false,
            answer_applied: false,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Вход в комнату: подписка, чтение журнала, определение роли и, для
    /// инициатора, публикация Offer. Подписка оформляется до чтения
    /// журнала, иначе сигналы между снимком и началом доставки теряются.
    pub async fn begin(
        &mut self,
        assigned: Option<Role>,
    ) -> Result<(Role, SignalSubscription), SessionError> {
        self.state = NegotiationState::RoleUndetermined;

        let subscription = self.mailbox.subscribe(&self.room_id).await?;
        let backlog = self.mailbox.history(&self.room_id).await?;

        let role = match assigned {
            Some(role) => role,
            None if backlog.is_empty() => Role::Initiator,
            None => Role::Responder,
        };
        self.role = Some(role);
        self.state = match role {
            Role::Initiator => NegotiationState::Offering,
            Role::Responder => NegotiationState::Answering,
        };
        info!("Joining room {} as {}", self.room_id, role);

        for envelope in backlog {
            self.handle_signal(envelope).await?;
        }

        if role == Role::Initiator {
            self.publish_offer().await?;
        }

        Ok((role, subscription))
    }

    async fn publish_offer(&mut self) -> Result<(), SessionError> {
        let offer = self.transport.create_offer().await?;
        self.mailbox
            .append(&self.room_id, &self.local_id, offer.into())
            .await?;
        debug!("Published offer for room {}", self.room_id);
        Ok(())
    }

    /// Единая точка обработки входящих сигналов, и из журнала, и из живой
    /// доставки. Сбой применения к транспорту логируется и не меняет
    /// состояние; отказ реле при публикации ответа возвращается вызвавшему,
    /// на входе он срывает `begin`.
    pub async fn handle_signal(&mut self, envelope: SignalEnvelope) -> Result<(), SessionError> {
        if envelope.sender == self.local_id {
            trace!("Skipping own signal {}", envelope.id);
            return Ok(());
        }
        if !self.seen.insert(envelope.id) {
            debug!("Skipping duplicate signal {}", envelope.id);
            return Ok(());
        }
        if self.state == NegotiationState::Closed {
            debug!("Ignoring {} after close", envelope.payload.kind());
            return Ok(());
        }

        match envelope.payload {
            SignalPayload::Offer { sdp } => self.handle_offer(sdp).await,
            SignalPayload::Answer { sdp } => {
                self.handle_answer(sdp).await;
                Ok(())
            }
            SignalPayload::IceCandidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => {
                self.handle_candidate(IceCandidate {
                    candidate,
                    sdp_mid,
                    sdp_m_line_index,
                })
                .await;
                Ok(())
            }
        }
    }

    async fn handle_offer(&mut self, sdp: String) -> Result<(), SessionError> {
        if self.offer_applied || self.state == NegotiationState::Connected {
            debug!("Ignoring extra offer in state {:?}", self.state);
            return Ok(());
        }
        if let Err(e) = self
            .transport
            .set_remote_description(SessionDescription::offer(sdp))
            .await
        {
            warn!("Failed to apply remote offer: {}", e);
            return Ok(());
        }
        self.remote_description_ready().await;

        let answer = match self.transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Failed to create answer: {}", e);
                return Ok(());
            }
        };
        // Оффер считается принятым только после того, как ответ дописан в
        // журнал: без опубликованного ответа рукопожатие мертво.
        self.mailbox
            .append(&self.room_id, &self.local_id, answer.into())
            .await?;
        self.offer_applied = true;
        self.state = NegotiationState::Negotiating;
        debug!("Published answer for room {}", self.room_id);
        Ok(())
    }

    async fn handle_answer(&mut self, sdp: String) {
        let receptive = matches!(
            self.state,
            NegotiationState::Offering | NegotiationState::Negotiating
        );
        if self.answer_applied || !receptive {
            debug!("Ignoring answer in state {:?}", self.state);
            return;
        }
        if let Err(e) = self
            .transport
            .set_remote_description(SessionDescription::answer(sdp))
            .await
        {
            warn!("Failed to apply remote answer: {}", e);
            return;
        }
        self.answer_applied = true;
        self.state = NegotiationState::Negotiating;
        self.remote_description_ready().await;
    }

    async fn handle_candidate(&mut self, candidate: IceCandidate) {
        if !self.have_remote_description {
            // Кандидаты до удаленного SDP откладываются и применяются после него.
            trace!("Buffering ICE candidate until remote description is set");
            self.pending_candidates.push(candidate);
            return;
        }
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate: {}", e);
        }
    }

    async fn remote_description_ready(&mut self) {
        self.have_remote_description = true;
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!("Failed to add buffered ICE candidate: {}", e);
            }
        }
    }

    /// Публикация локального кандидата не блокирует цикл сессии: запись
    /// уходит в фоне, неудача только логируется.
    pub fn publish_candidate(&self, candidate: IceCandidate) {
        let mailbox = self.mailbox.clone();
        let room_id = self.room_id.clone();
        let sender = self.local_id.clone();

        tokio::spawn(async move {
            if let Err(e) = mailbox.append(&room_id, &sender, candidate.into()).await {
                warn!("Failed to publish ICE candidate: {}", e);
            }
        });
    }

    /// Отметить приход удаленной дорожки. Возвращает true при первом
    /// переходе в Connected.
    pub fn media_established(&mut self) -> bool {
        match self.state {
            NegotiationState::Connected | NegotiationState::Closed => false,
            _ => {
                self.state = NegotiationState::Connected;
                info!("Room {} connected", self.room_id);
                true
            }
        }
    }

    pub fn close(&mut self) {
        self.state = NegotiationState::Closed;
    }
}
