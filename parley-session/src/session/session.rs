use crate::error::SessionError;
use crate::media::{LocalMedia, LocalTrack, MediaDevices};
use crate::relay::{Mailbox, RoomStore, SignalSubscription};
use crate::room::{AutoEndGuard, RoomLifecycle};
use crate::session::session_command::SessionCommand;
use crate::session::session_config::SessionConfig;
use crate::session::session_event::{EndReason, SessionEvent};
use crate::signaling::SignalingCoordinator;
use crate::transport::{PeerConnectionState, PeerTransport, TransportEvent, WebRtcTransport};
use parley_core::model::{Role, Room, TrackKind};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Главный цикл одной сессии звонка: держит транспорт, медиа и переговоры,
/// принимает команды интерфейса и события транспорта.
pub struct Session {
    room: Room,
    devices: Arc<dyn MediaDevices>,
    local_media: LocalMedia,
    screen_track: Option<Arc<LocalTrack>>,
    coordinator: SignalingCoordinator,
    transport: Arc<dyn PeerTransport>,
    lifecycle: RoomLifecycle,
    subscription: SignalSubscription,
    command_rx: mpsc::Receiver<SessionCommand>,
    command_tx: mpsc::Sender<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    auto_end_rx: oneshot::Receiver<()>,
    auto_end_guard: AutoEndGuard,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    signals_open: bool,
    transport_open: bool,
    timer_armed: bool,
    ended: bool,
}

impl Session {
    /// Вход в комнату с реальным WebRTC транспортом. Комната проверяется
    /// до создания соединения, чтобы не поднимать транспорт ради
    /// несуществующей или уже закрытой комнаты.
    pub async fn start(
        config: SessionConfig,
        store: Arc<dyn RoomStore>,
        mailbox: Arc<dyn Mailbox>,
        devices: Arc<dyn MediaDevices>,
    ) -> Result<SessionHandle, SessionError> {
        RoomLifecycle::new(store.clone())
            .load_room(&config.room_id)
            .await?;

        let (transport_tx, transport_rx) = mpsc::channel(256);
        let transport =
            Arc::new(WebRtcTransport::new(config.transport.clone(), transport_tx).await?);

        Self::start_with_transport(config, store, mailbox, devices, transport, transport_rx).await
    }

    /// Вход с готовым транспортом. Порядок шагов фиксирован: загрузка
    /// комнаты, таймер, захват медиа, дорожки, подписка и рукопожатие.
    /// Любой сбой до возврата отменяет вход: guard гасит таймер, а
    /// переданный транспорт закрывается здесь же.
    pub async fn start_with_transport(
        config: SessionConfig,
        store: Arc<dyn RoomStore>,
        mailbox: Arc<dyn Mailbox>,
        devices: Arc<dyn MediaDevices>,
        transport: Arc<dyn PeerTransport>,
        transport_rx: mpsc::Receiver<TransportEvent>,
    ) -> Result<SessionHandle, SessionError> {
        let launched = Self::launch(
            config,
            store,
            mailbox,
            devices,
            transport.clone(),
            transport_rx,
        )
        .await;
        match launched {
            Ok(handle) => Ok(handle),
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    warn!("Failed to close transport after aborted join: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn launch(
        config: SessionConfig,
        store: Arc<dyn RoomStore>,
        mailbox: Arc<dyn Mailbox>,
        devices: Arc<dyn MediaDevices>,
        transport: Arc<dyn PeerTransport>,
        transport_rx: mpsc::Receiver<TransportEvent>,
    ) -> Result<SessionHandle, SessionError> {
        let lifecycle = RoomLifecycle::new(store);
        let room = lifecycle.load_room(&config.room_id).await?;

        let (auto_end_guard, auto_end_rx) =
            lifecycle.schedule_auto_end(room.id.clone(), room.duration());

        let local_media = devices.acquire_user_media().await?;
        transport.add_local_track(local_media.audio.clone()).await?;
        transport.add_local_track(local_media.video.clone()).await?;

        let mut coordinator = SignalingCoordinator::new(
            room.id.clone(),
            config.participant_id.clone(),
            mailbox,
            transport.clone(),
        );
        let (role, subscription) = coordinator.begin(config.role).await?;

        let (command_tx, command_rx) = mpsc::channel(100);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let _ = event_tx.send(SessionEvent::Joined { role });
        let _ = event_tx.send(SessionEvent::StateChanged(coordinator.state()));

        let session = Session {
            room: room.clone(),
            devices,
            local_media,
            screen_track: None,
            coordinator,
            transport,
            lifecycle,
            subscription,
            command_rx,
            command_tx: command_tx.clone(),
            transport_rx,
            auto_end_rx,
            auto_end_guard,
            event_tx,
            signals_open: true,
            transport_open: true,
            timer_armed: true,
            ended: false,
        };
        tokio::spawn(session.run());

        Ok(SessionHandle {
            room,
            role,
            command_tx,
            event_rx,
        })
    }

    async fn run(mut self) {
        info!("Session event loop started for room {}", self.room.id);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => {
                            if self.handle_command(c).await {
                                break;
                            }
                        }
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            self.abandon().await;
                            break;
                        }
                    }
                }

                signal = self.subscription.recv(), if self.signals_open => {
                    match signal {
                        Some(envelope) => {
                            let before = self.coordinator.state();
                            if let Err(e) = self.coordinator.handle_signal(envelope).await {
                                warn!("Failed to process incoming signal: {}", e);
                            }
                            let after = self.coordinator.state();
                            if after != before {
                                let _ = self.event_tx.send(SessionEvent::StateChanged(after));
                            }
                        }
                        None => {
                            warn!("Mailbox subscription closed unexpectedly");
                            self.signals_open = false;
                        }
                    }
                }

                evt = self.transport_rx.recv(), if self.transport_open => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            self.transport_open = false;
                        }
                    }
                }

                fired = &mut self.auto_end_rx, if self.timer_armed => {
                    self.timer_armed = false;
                    if fired.is_ok() {
                        self.finish(EndReason::Timeout).await;
                        break;
                    }
                }
            }
        }

        info!("Session event loop finished for room {}", self.room.id);
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> bool {
        match cmd {
            SessionCommand::ToggleMute => {
                let audio = &self.local_media.audio;
                audio.set_enabled(!audio.is_enabled());
                debug!("Microphone enabled: {}", audio.is_enabled());
                false
            }

            SessionCommand::ToggleCamera => {
                let video = &self.local_media.video;
                video.set_enabled(!video.is_enabled());
                debug!("Camera enabled: {}", video.is_enabled());
                false
            }

            SessionCommand::StartScreenShare => {
                self.start_screen_share().await;
                false
            }

            SessionCommand::StopScreenShare => {
                self.stop_screen_share().await;
                false
            }

            SessionCommand::EndSession => {
                self.finish(EndReason::Local).await;
                true
            }
        }
    }

    async fn start_screen_share(&mut self) {
        if self.screen_track.is_some() {
            debug!("Screen share already active");
            return;
        }
        let track = match self.devices.acquire_display_media().await {
            Ok(track) => track,
            Err(e) => {
                warn!("Screen capture failed: {}", e);
                return;
            }
        };
        if let Err(e) = self
            .transport
            .replace_track(TrackKind::Video, track.clone())
            .await
        {
            warn!("Failed to switch outgoing video to screen: {}", e);
            return;
        }

        // Захват может оборваться извне; наблюдатель возвращает камеру.
        let mut ended = track.ended();
        let command_tx = self.command_tx.clone();
        tokio::spawn(async move {
            while ended.changed().await.is_ok() {
                if *ended.borrow() {
                    let _ = command_tx.send(SessionCommand::StopScreenShare).await;
                    break;
                }
            }
        });

        self.screen_track = Some(track);
        info!("Screen share started");
        let _ = self.event_tx.send(SessionEvent::ScreenShare { active: true });
    }

    async fn stop_screen_share(&mut self) {
        let Some(track) = self.screen_track.take() else {
            debug!("Screen share is not active");
            return;
        };
        track.mark_ended();
        if let Err(e) = self
            .transport
            .replace_track(TrackKind::Video, self.local_media.video.clone())
            .await
        {
            warn!("Failed to restore camera track: {}", e);
        }
        info!("Screen share stopped");
        let _ = self.event_tx.send(SessionEvent::ScreenShare { active: false });
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(candidate) => {
                if !self.ended {
                    self.coordinator.publish_candidate(candidate);
                }
            }

            TransportEvent::RemoteTrack(track) => {
                if self.coordinator.media_established() {
                    let _ = self
                        .event_tx
                        .send(SessionEvent::StateChanged(self.coordinator.state()));
                }
                let _ = self.event_tx.send(SessionEvent::RemoteMedia(track));
            }

            TransportEvent::ConnectionStateChanged(state) => match state {
                PeerConnectionState::Failed
                | PeerConnectionState::Disconnected
                | PeerConnectionState::Closed => {
                    warn!("Peer connection degraded: {:?}", state);
                    let _ = self.event_tx.send(SessionEvent::ConnectionLost);
                }
                _ => debug!("Peer connection state: {:?}", state),
            },
        }
    }

    /// Завершение по команде или по таймеру: таймер снимается, комната
    /// закрывается идемпотентно, транспорт закрывается.
    async fn finish(&mut self, reason: EndReason) {
        if self.ended {
            return;
        }
        self.ended = true;

        self.auto_end_guard.cancel();
        self.coordinator.close();

        if let Err(e) = self.lifecycle.end_room(&self.room.id).await {
            warn!("Failed to end room {}: {}", self.room.id, e);
        }
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport: {}", e);
        }

        info!("Session over for room {} ({:?})", self.room.id, reason);
        let _ = self.event_tx.send(SessionEvent::Ended { reason });
    }

    /// Ручка сброшена: закрывается только локальная сторона, комната
    /// остается активной для второго участника и его таймера.
    async fn abandon(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.coordinator.close();
        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport: {}", e);
        }
    }
}

/// Ручка сессии: команды внутрь, события наружу.
#[derive(Debug)]
pub struct SessionHandle {
    room: Room,
    role: Role,
    command_tx: mpsc::Sender<SessionCommand>,
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionHandle {
    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Следующее событие сессии. `None` после завершения цикла.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.event_rx.recv().await
    }

    pub async fn toggle_mute(&self) {
        self.send(SessionCommand::ToggleMute).await;
    }

    pub async fn toggle_camera(&self) {
        self.send(SessionCommand::ToggleCamera).await;
    }

    pub async fn start_screen_share(&self) {
        self.send(SessionCommand::StartScreenShare).await;
    }

    pub async fn stop_screen_share(&self) {
        self.send(SessionCommand::StopScreenShare).await;
    }

    /// Завершить звонок. Повторные вызовы безвредны.
    pub async fn end(&self) {
        self.send(SessionCommand::EndSession).await;
    }

    async fn send(&self, cmd: SessionCommand) {
        if self.command_tx.send(cmd).await.is_err() {
            debug!("Session loop is gone, command dropped");
        }
    }
}
