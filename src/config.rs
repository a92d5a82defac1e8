//! Configuración del servicio.
//!
//! Orden de carga:
//! 1. valores por defecto
//! 2. `config/sign2text.toml` (o la ruta de `SIGN2TEXT_CONFIG`), si existe
//! 3. variables de entorno `SIGN2TEXT__SECCION__CLAVE`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::ffmpeg::decoder::DecoderConfig;
use crate::application::services::PipelineOptions;
use crate::domain::model::{DetectorParams, ModelId};
use crate::domain::segmentation::SegmentParams;

const DEFAULT_CONFIG_FILE: &str = "config/sign2text.toml";
const ENV_PREFIX: &str = "SIGN2TEXT";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub detection: DetectionConfig,
    pub segmentation: SegmentationConfig,
    pub decoder: DecoderSection,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 7000, max_upload_bytes: 200 * 1024 * 1024 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub classifier_path: String,
    pub detector_path: String,
    pub detector_input_size: u32,
    pub intra_threads: usize,
    pub classifier_batch_size: usize,
    /// Fichero de etiquetas, una por línea. Sin él se usa el vocabulario integrado.
    pub labels_path: Option<PathBuf>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            classifier_path: "models/sign_classifier.onnx".into(),
            detector_path: "models/hand_landmarks.onnx".into(),
            detector_input_size: 256,
            intra_threads: 4,
            classifier_batch_size: 1,
            labels_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub bbox_margin_px: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { min_detection_confidence: 0.5, min_tracking_confidence: 0.5, bbox_margin_px: 20.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub window_seconds: f64,
    pub min_confidence: f32,
    pub default_fps: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self { window_seconds: 2.0, min_confidence: 0.5, default_fps: 30.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderSection {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl Default for DecoderSection {
    fn default() -> Self {
        Self { ffmpeg_bin: "ffmpeg".into(), ffprobe_bin: "ffprobe".into() }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    Gemini,
    Disabled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            model: None,
            api_key: None,
            timeout_secs: 20,
            temperature: 0.2,
        }
    }
}

impl LlmConfig {
    pub fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            match self.provider {
                LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
                LlmProvider::Ollama | LlmProvider::Disabled => "http://localhost:11434",
            }
            .to_string()
        })
    }

    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| {
            match self.provider {
                LlmProvider::Gemini => "gemini-1.5-flash",
                LlmProvider::Ollama => "llama3.2",
                LlmProvider::Disabled => "none",
            }
            .to_string()
        })
    }

    /// Clave de config; si falta, `GEMINI_API_KEY`.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = std::env::var("SIGN2TEXT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let env = config::Environment::with_prefix(ENV_PREFIX).separator("__");
        let cfg = Self::from_sources(Some(Path::new(&path)), env)?;
        tracing::info!("⚙️ Configuration loaded (file: {})", path);
        Ok(cfg)
    }

    /// Construye la configuración a partir de un fichero opcional y del entorno.
    pub fn from_sources(file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(false));
        }
        let cfg: AppConfig = builder
            .add_source(env)
            .build()
            .context("reading configuration")?
            .try_deserialize()
            .context("parsing configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("server.port must be greater than 0");
        }
        for (name, value) in [
            ("detection.min_detection_confidence", self.detection.min_detection_confidence),
            ("detection.min_tracking_confidence", self.detection.min_tracking_confidence),
            ("segmentation.min_confidence", self.segmentation.min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        if !(self.segmentation.window_seconds > 0.0) {
            bail!("segmentation.window_seconds must be positive");
        }
        if !(self.segmentation.default_fps > 0.0) {
            bail!("segmentation.default_fps must be positive");
        }
        if self.models.classifier_batch_size == 0 {
            bail!("models.classifier_batch_size must be greater than 0");
        }
        if self.models.detector_input_size == 0 {
            bail!("models.detector_input_size must be greater than 0");
        }
        Ok(())
    }

    pub fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            input_size: self.models.detector_input_size,
            min_detection_confidence: self.detection.min_detection_confidence,
            min_tracking_confidence: self.detection.min_tracking_confidence,
            bbox_margin_px: self.detection.bbox_margin_px,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            segment: SegmentParams {
                window_seconds: self.segmentation.window_seconds,
                min_confidence: self.segmentation.min_confidence,
            },
            default_fps: self.segmentation.default_fps,
            bbox_margin_px: self.detection.bbox_margin_px,
            classifier_batch_size: self.models.classifier_batch_size,
        }
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            ffmpeg_bin: self.decoder.ffmpeg_bin.clone(),
            ffprobe_bin: self.decoder.ffprobe_bin.clone(),
        }
    }

    pub fn classifier_model(&self) -> ModelId {
        ModelId { name: "sign_classifier".into(), onnx_path: self.models.classifier_path.clone() }
    }

    pub fn detector_model(&self) -> ModelId {
        ModelId { name: "hand_detector".into(), onnx_path: self.models.detector_path.clone() }
    }
}
