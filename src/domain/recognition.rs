use serde::{Deserialize, Serialize};

use super::prediction::SignSequence;

pub const NO_HANDS_MESSAGE: &str = "No hand detected in video.";

/// Resultado observable de una petición (éxito o degradación controlada).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub success: bool,
    pub predicted_signs: Vec<String>,
    pub sentence: String,
    /// Frames con vector de características (antes de ventanear).
    pub total_frames: usize,
    /// fps usado para calcular el tamaño de ventana.
    pub fps: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Los tres desenlaces que distingue el cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Signos reconocidos y frase compuesta a partir de varios signos.
    Complete,
    /// Signos reconocidos con frase trivial, o ningún signo.
    Degraded,
}

impl RecognitionResult {
    pub fn recognized(signs: SignSequence, sentence: String, total_frames: usize, fps: f64) -> Self {
        Self {
            success: !signs.is_empty(),
            predicted_signs: signs.into_inner(),
            sentence,
            total_frames,
            fps,
            message: None,
        }
    }

    pub fn no_hands(fps: f64) -> Self {
        Self {
            success: false,
            predicted_signs: Vec::new(),
            sentence: String::new(),
            total_frames: 0,
            fps,
            message: Some(NO_HANDS_MESSAGE.to_string()),
        }
    }

    pub fn outcome(&self) -> RecognitionOutcome {
        if self.success && self.predicted_signs.len() > 1 {
            RecognitionOutcome::Complete
        } else {
            RecognitionOutcome::Degraded
        }
    }
}
