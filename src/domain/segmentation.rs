use serde::{Deserialize, Serialize};

use super::prediction::{FramePrediction, SignSequence};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentParams {
    /// Duración de cada ventana en segundos.
    pub window_seconds: f64,
    /// Confianza mínima para que una predicción vote en su ventana.
    pub min_confidence: f32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self { window_seconds: 2.0, min_confidence: 0.5 }
    }
}

/// `max(round(fps * window_seconds), 1)`. Un fps no finito cae al mínimo.
pub fn window_size(fps: f64, window_seconds: f64) -> usize {
    let raw = (fps * window_seconds).round();
    if raw.is_finite() && raw >= 1.0 {
        raw as usize
    } else {
        1
    }
}

/// Etiqueta mayoritaria de una ventana.
///
/// Votan solo las predicciones con confianza >= `min_confidence`; si ninguna
/// pasa el umbral votan todas. Los empates los gana la primera etiqueta que
/// aparece en el subconjunto que vota.
pub fn majority_label(window: &[FramePrediction], min_confidence: f32) -> Option<&str> {
    let confident: Vec<&FramePrediction> =
        window.iter().filter(|p| p.confidence >= min_confidence).collect();
    let voters: Vec<&FramePrediction> = if confident.is_empty() {
        window.iter().collect()
    } else {
        confident
    };

    // Orden de primera aparición -> desempate estable.
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for p in voters {
        match tally.iter_mut().find(|(label, _)| *label == p.label) {
            Some((_, count)) => *count += 1,
            None => tally.push((p.label.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, count) in tally {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Elimina repeticiones consecutivas; las no adyacentes se conservan.
pub fn collapse_consecutive(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if out.last() != Some(&label) {
            out.push(label);
        }
    }
    out
}

/// Ventanas fijas + voto por ventana + colapso de repetidos.
pub fn segment(predictions: &[FramePrediction], fps: f64, params: &SegmentParams) -> SignSequence {
    let size = window_size(fps, params.window_seconds);
    let per_window: Vec<String> = predictions
        .chunks(size)
        .filter_map(|w| majority_label(w, params.min_confidence))
        .map(str::to_owned)
        .collect();
    SignSequence::new(collapse_consecutive(per_window))
}
