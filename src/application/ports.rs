use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{
    errors::DomainResult,
    landmarks::{FeatureVector, HandDetections},
    model::ModelId,
    prediction::FramePrediction,
    video::{VideoInfo, VideoUpload},
    vocabulary::Vocabulary,
};

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

/// Stream de frames RGB de un vídeo ya preparado.
pub trait FrameSource: Send {
    fn info(&self) -> &VideoInfo;
    /// `Ok(None)` al final del vídeo.
    fn next_frame(&mut self) -> DomainResult<Option<RgbImage>>;
}

pub trait VideoDecoderPort: Send + Sync {
    /// Prepara el vídeo y abre su stream de frames.
    /// `Ok(None)` si el contenido no es decodificable (se trata como cero frames).
    fn open(&self, upload: &VideoUpload) -> DomainResult<Option<Box<dyn FrameSource>>>;
}

/// Sesión de seguimiento de manos, una por petición.
pub trait HandTrackingSession: Send {
    fn detect(&mut self, frame: &RgbImage) -> DomainResult<HandDetections>;
}

/// Plantilla compartida del detector; cada vídeo abre su propia sesión.
pub trait HandDetectorPort: Send + Sync {
    fn start_session(&self) -> Box<dyn HandTrackingSession + '_>;
}

pub trait SignClassifierPort: Send + Sync {
    fn vocabulary(&self) -> &Vocabulary;

    fn classify(&self, features: &FeatureVector) -> DomainResult<FramePrediction>;

    fn classify_batch(&self, batch: &[FeatureVector]) -> DomainResult<Vec<FramePrediction>> {
        batch.iter().map(|fv| self.classify(fv)).collect()
    }
}

#[async_trait]
pub trait SentenceGeneratorPort: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, prompt: &str) -> DomainResult<String>;
}
