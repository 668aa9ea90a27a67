use crate::error::MediaError;
use crate::media::track::{LocalMedia, LocalTrack};
use async_trait::async_trait;
use std::sync::Arc;

/// Источник локальных дорожек. Отказ в захвате устройств выражается как
/// `MediaError::AcquisitionDenied`.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Захват пользовательских устройств: микрофон и камера.
    async fn acquire_user_media(&self) -> Result<LocalMedia, MediaError>;

    /// Захват экрана. Дорожка живет до `mark_ended`.
    async fn acquire_display_media(&self) -> Result<Arc<LocalTrack>, MediaError>;
}

/// Устройства, отдающие sample-дорожки. Кадры в такие дорожки пишет сам
/// вызывающий код (кодек, генератор, конвейер захвата).
#[derive(Default)]
pub struct SampleMediaDevices;

impl SampleMediaDevices {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MediaDevices for SampleMediaDevices {
    async fn acquire_user_media(&self) -> Result<LocalMedia, MediaError> {
        Ok(LocalMedia {
            audio: LocalTrack::audio("microphone"),
            video: LocalTrack::video("camera"),
        })
    }

    async fn acquire_display_media(&self) -> Result<Arc<LocalTrack>, MediaError> {
        Ok(LocalTrack::video("screen"))
    }
}
