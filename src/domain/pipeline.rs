use serde::{Deserialize, Serialize};
use std::fmt;

/// Etapas por las que pasa cada petición de reconocimiento.
/// `Failed` es terminal y alcanzable desde cualquier otra etapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Received,
    Decoding,
    Extracting,
    Classifying,
    Segmenting,
    Composing,
    Responding,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Decoding => "decoding",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Classifying => "classifying",
            PipelineStage::Segmenting => "segmenting",
            PipelineStage::Composing => "composing",
            PipelineStage::Responding => "responding",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
