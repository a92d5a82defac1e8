use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Predicción del clasificador para un frame con manos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePrediction {
    pub label: String,
    pub confidence: f32,
}

impl FramePrediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self { label: label.into(), confidence: confidence.clamp(0.0, 1.0) }
    }
}

/// Glosa: lista ordenada de signos tras segmentar y colapsar repeticiones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignSequence(Vec<String>);

impl SignSequence {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Unión literal con espacios simples, el texto de respaldo del compositor.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for SignSequence {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<&str>> for SignSequence {
    fn from(labels: Vec<&str>) -> Self {
        Self(labels.into_iter().map(str::to_owned).collect())
    }
}
