use serde::{Deserialize, Serialize};

use crate::application::services::ServiceStatus;
use crate::domain::recognition::RecognitionResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

impl Default for BannerResponse {
    fn default() -> Self {
        Self {
            message: "Sign Language Prediction API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            status: "running".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub label_encoder_loaded: bool,
    pub detector_loaded: bool,
    pub vocabulary_size: usize,
    pub sentence_generator: String,
}

impl From<ServiceStatus> for HealthResponse {
    fn from(s: ServiceStatus) -> Self {
        Self {
            status: if s.models_loaded { "healthy" } else { "degraded" }.into(),
            model_loaded: s.models_loaded,
            label_encoder_loaded: s.vocabulary_size > 0,
            detector_loaded: s.models_loaded,
            vocabulary_size: s.vocabulary_size,
            sentence_generator: s.generator,
        }
    }
}

/// Cuerpo de `/predict_signs/` para éxito, degradación y fallo interno.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    pub predicted_signs: Vec<String>,
    pub sentence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PredictResponse {
    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            predicted_signs: Vec::new(),
            sentence: String::new(),
            total_frames: None,
            fps: None,
            message: Some(message),
        }
    }
}

impl From<RecognitionResult> for PredictResponse {
    fn from(r: RecognitionResult) -> Self {
        Self {
            success: r.success,
            predicted_signs: r.predicted_signs,
            sentence: r.sentence,
            total_frames: Some(r.total_frames),
            fps: Some(r.fps),
            message: r.message,
        }
    }
}

/// Error de entrada del cliente (HTTP 400).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}
