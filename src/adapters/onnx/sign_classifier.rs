use anyhow::{anyhow, bail, Result};
use ndarray::{Array3, ArrayView2};
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;

use crate::adapters::onnx::session::build_session;
use crate::application::ports::SignClassifierPort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::landmarks::{FeatureVector, FEATURE_POINTS};
use crate::domain::prediction::FramePrediction;
use crate::domain::vocabulary::Vocabulary;

/// Clasificador de signos por frame. Entrada `[N, 42, 2]`, salida `[N, K]`.
pub struct OnnxSignClassifier {
    session: Mutex<Session>,
    vocabulary: Vocabulary,
}

impl OnnxSignClassifier {
    pub fn load(path: &str, vocabulary: Vocabulary, intra_threads: usize) -> Result<Self> {
        let session = build_session(path, intra_threads)?;
        tracing::info!("🤟 Sign classifier loaded from {} ({} labels)", path, vocabulary.len());
        Ok(Self { session: Mutex::new(session), vocabulary })
    }

    fn run(&self, batch: &[FeatureVector]) -> Result<Vec<FramePrediction>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let n = batch.len();
        let flat: Vec<f32> = batch.iter().flat_map(FeatureVector::to_flat).collect();
        let input = Array3::from_shape_vec((n, FEATURE_POINTS, 2), flat)?;

        let input_shape = vec![n as i64, FEATURE_POINTS as i64, 2];
        let (data, _offset) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, data))?;

        let mut session = self.session.lock().map_err(|_| anyhow!("classifier session poisoned"))?;
        let outputs = session.run(ort::inputs![input_tensor])?;
        let (shape, probs) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 2 || dims[0] != n || dims[1] == 0 {
            bail!("unexpected classifier output shape {:?} for batch of {}", dims, n);
        }
        let rows = ArrayView2::from_shape((dims[0], dims[1]), probs)?;

        rows.outer_iter()
            .map(|row| decode_prediction(&row.to_vec(), &self.vocabulary))
            .collect()
    }
}

/// Softmax estable.
fn softmax(row: &[f32]) -> Vec<f32> {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = row.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Si la fila ya es una distribución (valores en [0,1] que suman 1) se usa tal
/// cual; si son logits se les aplica softmax.
pub fn to_probabilities(row: &[f32]) -> Vec<f32> {
    let in_range = row.iter().all(|v| (0.0..=1.0).contains(v));
    let sum: f32 = row.iter().sum();
    if in_range && (sum - 1.0).abs() <= 1e-3 {
        row.to_vec()
    } else {
        softmax(row)
    }
}

/// argmax -> etiqueta del vocabulario. Empates: el índice menor.
pub fn decode_prediction(row: &[f32], vocabulary: &Vocabulary) -> Result<FramePrediction> {
    if row.len() > vocabulary.len() {
        bail!("classifier emits {} classes but vocabulary has {}", row.len(), vocabulary.len());
    }
    let probs = to_probabilities(row);
    let (index, confidence) = probs
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ if p.is_nan() => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| anyhow!("classifier produced no usable scores"))?;

    let label = vocabulary
        .label(index)
        .ok_or_else(|| anyhow!("class index {} outside vocabulary", index))?;
    Ok(FramePrediction::new(label, confidence))
}

impl SignClassifierPort for OnnxSignClassifier {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn classify(&self, features: &FeatureVector) -> DomainResult<FramePrediction> {
        self.classify_batch(std::slice::from_ref(features))?
            .pop()
            .ok_or_else(|| DomainError::OperationFailed("classifier returned no prediction".into()))
    }

    fn classify_batch(&self, batch: &[FeatureVector]) -> DomainResult<Vec<FramePrediction>> {
        self.run(batch)
            .map_err(|e| DomainError::OperationFailed(format!("sign classifier: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_labels(["I", "happy", "today"]).unwrap()
    }

    #[test]
    fn picks_highest_probability() {
        let p = decode_prediction(&[0.1, 0.7, 0.2], &vocab()).unwrap();
        assert_eq!(p, FramePrediction::new("happy", 0.7));
    }

    #[test]
    fn ties_take_the_lowest_index() {
        let p = decode_prediction(&[0.4, 0.4, 0.2], &vocab()).unwrap();
        assert_eq!(p.label, "I");
    }

    #[test]
    fn logits_are_softmaxed() {
        let p = decode_prediction(&[2.0, -1.0, 0.5], &vocab()).unwrap();
        assert_eq!(p.label, "I");
        assert!(p.confidence > 0.0 && p.confidence < 1.0);

        let probs = to_probabilities(&[2.0, -1.0, 0.5]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn distributions_pass_through() {
        assert_eq!(to_probabilities(&[0.25, 0.75]), vec![0.25, 0.75]);
    }

    #[test]
    fn more_classes_than_labels_is_an_error() {
        assert!(decode_prediction(&[0.1, 0.2, 0.3, 0.4], &vocab()).is_err());
        assert!(decode_prediction(&[], &vocab()).is_err());
    }

    #[test]
    fn fewer_classes_than_labels_is_fine() {
        let p = decode_prediction(&[0.2, 0.8], &vocab()).unwrap();
        assert_eq!(p.label, "happy");
    }
}
