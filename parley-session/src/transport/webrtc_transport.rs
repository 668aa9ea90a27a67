use crate::error::TransportError;
use crate::media::{LocalTrack, RemoteTrack};
use crate::transport::peer_transport::PeerTransport;
use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::{PeerConnectionState, TransportEvent};
use async_trait::async_trait;
use parley_core::model::{IceCandidate, SdpKind, SessionDescription, TrackKind};
use std::collections::HashMap;
use std::default::Default;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::info;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_remote::TrackRemote;

pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    senders: Mutex<HashMap<TrackKind, Arc<RTCRtpSender>>>,
}

impl WebRtcTransport {
    /// Инициализация нового WebRTC соединения.
    /// event_tx — канал, в который транспорт будет "выплевывать" события для главного цикла сессии.
    pub async fn new(
        config: TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        // 1. Настройка MediaEngine (регистрация кодеков)
        let mut m = MediaEngine::default();
        m.register_default_codecs().map_err(TransportError::Setup)?;
        // 2. Регистрация интерцепторов (метрики, RTCP отчеты)
        let registry =
            register_default_interceptors(Registry::new(), &mut m).map_err(TransportError::Setup)?;

        // 3. Создание API объекта
        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        // 4. Конфигурация ICE серверов (STUN/TURN)
        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        // 5. Создание PeerConnection
        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(TransportError::Setup)?,
        );

        // --- Настройка Callbacks (Замыканий) ---
        // event_tx клонируется для каждого замыкания, так как они должны быть 'static.

        // A. Мониторинг состояния соединения (Connected/Disconnected)
        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    if let Some(state) = map_connection_state(s) {
                        let _ = tx.send(TransportEvent::ConnectionStateChanged(state)).await;
                    }
                })
            },
        ));

        // B. Trickle ICE: локальные кандидаты уходят наружу событием
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    }))
                    .await;
            })
        }));

        // C. Дорожки удаленного участника
        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>, _receiver, _transceiver| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => TrackKind::Audio,
                        _ => TrackKind::Video,
                    };
                    info!("Remote {} track arrived: {}", kind, track.id());
                    let _ = tx
                        .send(TransportEvent::RemoteTrack(RemoteTrack {
                            kind,
                            id: track.id(),
                        }))
                        .await;
                })
            },
        ));

        Ok(Self {
            peer_connection,
            senders: Mutex::new(HashMap::new()),
        })
    }
}

fn map_connection_state(state: RTCPeerConnectionState) -> Option<PeerConnectionState> {
    match state {
        RTCPeerConnectionState::New => Some(PeerConnectionState::New),
        RTCPeerConnectionState::Connecting => Some(PeerConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(PeerConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(PeerConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(PeerConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(PeerConnectionState::Closed),
        RTCPeerConnectionState::Unspecified => None,
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    /// Создать локальный SDP Offer и установить его как LocalDescription
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(TransportError::CreateDescription)?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(TransportError::CreateDescription)?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    /// Создать локальный SDP Answer и установить его как LocalDescription
    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(TransportError::CreateDescription)?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(TransportError::CreateDescription)?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        let remote = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp),
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp),
        }
        .map_err(TransportError::ApplyDescription)?;
        self.peer_connection
            .set_remote_description(remote)
            .await
            .map_err(TransportError::ApplyDescription)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(TransportError::ApplyCandidate)
    }

    async fn add_local_track(&self, track: Arc<LocalTrack>) -> Result<(), TransportError> {
        let sender = self
            .peer_connection
            .add_track(track.as_track_local())
            .await
            .map_err(TransportError::AttachTrack)?;
        self.senders.lock().await.insert(track.kind(), sender);
        Ok(())
    }

    async fn replace_track(
        &self,
        kind: TrackKind,
        track: Arc<LocalTrack>,
    ) -> Result<(), TransportError> {
        let sender = self
            .senders
            .lock()
            .await
            .get(&kind)
            .cloned()
            .ok_or(TransportError::MissingSender(kind))?;
        sender
            .replace_track(Some(track.as_track_local()))
            .await
            .map_err(TransportError::AttachTrack)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection
            .close()
            .await
            .map_err(TransportError::Close)
    }
}
