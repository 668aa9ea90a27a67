use crate::error::MediaError;
use bytes::Bytes;
use parley_core::model::TrackKind;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Локальная дорожка, которую сессия отдает в peer connection.
/// Выключенная дорожка молчит: `write_sample` отбрасывает кадры,
/// сама дорожка при этом остается в соединении.
pub struct LocalTrack {
    kind: TrackKind,
    label: String,
    rtp: Arc<TrackLocalStaticSample>,
    enabled: AtomicBool,
    ended_tx: watch::Sender<bool>,
}

impl LocalTrack {
    pub fn audio(label: &str) -> Arc<Self> {
        let capability = RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
            rtcp_feedback: vec![],
        };
        Self::with_capability(TrackKind::Audio, label, capability)
    }

    pub fn video(label: &str) -> Arc<Self> {
        let capability = RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            ..Default::default()
        };
        Self::with_capability(TrackKind::Video, label, capability)
    }

    fn with_capability(
        kind: TrackKind,
        label: &str,
        capability: RTCRtpCodecCapability,
    ) -> Arc<Self> {
        let (ended_tx, _) = watch::channel(false);
        Arc::new(Self {
            kind,
            label: label.to_owned(),
            rtp: Arc::new(TrackLocalStaticSample::new(
                capability,
                label.to_owned(),
                "parley".to_owned(),
            )),
            enabled: AtomicBool::new(true),
            ended_tx,
        })
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Записать кадр в дорожку. Для выключенной дорожки кадр отбрасывается.
    pub async fn write_sample(&self, data: Bytes, duration: Duration) -> Result<(), MediaError> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.rtp
            .write_sample(&Sample {
                data,
                duration,
                ..Default::default()
            })
            .await
            .map_err(MediaError::SampleWrite)
    }

    /// Источник дорожки иссяк (например, захват экрана остановлен извне).
    pub fn mark_ended(&self) {
        let _ = self.ended_tx.send_replace(true);
    }

    pub fn has_ended(&self) -> bool {
        *self.ended_tx.borrow()
    }

    /// Канал, по которому можно дождаться завершения источника.
    pub fn ended(&self) -> watch::Receiver<bool> {
        self.ended_tx.subscribe()
    }

    pub fn as_track_local(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.rtp.clone()
    }
}

/// Пара дорожек пользовательского захвата: микрофон и камера.
#[derive(Clone)]
pub struct LocalMedia {
    pub audio: Arc<LocalTrack>,
    pub video: Arc<LocalTrack>,
}

/// Метаданные дорожки, пришедшей от удаленного участника.
#[derive(Debug, Clone)]
pub struct RemoteTrack {
    pub kind: TrackKind,
    pub id: String,
}
