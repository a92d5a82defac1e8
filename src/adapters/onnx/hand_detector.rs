use anyhow::{anyhow, bail, Result};
use image::{imageops::FilterType, RgbImage};
use ndarray::{Array4, ArrayViewD, IxDyn};
use ort::session::Session;
use ort::value::Tensor;
use std::sync::Mutex;

use crate::adapters::onnx::session::build_session;
use crate::application::ports::{HandDetectorPort, HandTrackingSession};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::landmarks::{HandDetections, RawLandmark};
use crate::domain::model::DetectorParams;

/// Slot 0 = mano izquierda, slot 1 = mano derecha.
const HAND_SLOTS: usize = 2;

/// Salida cruda del modelo para un frame.
#[derive(Debug, Clone, Default)]
pub struct HandSlots {
    pub scores: [f32; HAND_SLOTS],
    pub landmarks: [Vec<RawLandmark>; HAND_SLOTS],
}

/// Detector holístico de manos (ONNX).
///
/// Entrada `[1, 3, S, S]` RGB en [0,1]; salidas `landmarks [1, 2, 21, 3]`
/// (x, y normalizadas al frame, z relativa) y `scores [1, 2]` (presencia por slot).
pub struct OnnxHandDetector {
    session: Mutex<Session>,
    params: DetectorParams,
}

impl OnnxHandDetector {
    pub fn load(path: &str, params: DetectorParams, intra_threads: usize) -> Result<Self> {
        let session = build_session(path, intra_threads)?;
        tracing::info!("✋ Hand landmark model loaded from {}", path);
        Ok(Self { session: Mutex::new(session), params })
    }

    pub fn infer(&self, rgb: &RgbImage) -> Result<HandSlots> {
        let size = self.params.input_size as usize;
        let resized = image::imageops::resize(rgb, size as u32, size as u32, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, size as i64, size as i64];
        let (data, _offset) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, data))?;

        let mut session = self.session.lock().map_err(|_| anyhow!("detector session poisoned"))?;
        let outputs = session.run(ort::inputs![input_tensor])?;

        let (lm_shape, lm_data) = outputs[0].try_extract_tensor::<f32>()?;
        let (score_shape, score_data) = outputs[1].try_extract_tensor::<f32>()?;

        let lm_dims: Vec<usize> = lm_shape.iter().map(|&d| d as usize).collect();
        let score_dims: Vec<usize> = score_shape.iter().map(|&d| d as usize).collect();
        decode_hand_slots(&lm_dims, lm_data, &score_dims, score_data)
    }
}

/// Convierte los tensores del modelo en slots por mano.
pub fn decode_hand_slots(
    lm_dims: &[usize],
    lm_data: &[f32],
    score_dims: &[usize],
    score_data: &[f32],
) -> Result<HandSlots> {
    if lm_dims.len() != 4 || lm_dims[1] < HAND_SLOTS || lm_dims[3] < 2 {
        bail!("unexpected landmarks shape {:?}", lm_dims);
    }
    if score_data.len() < HAND_SLOTS {
        bail!("unexpected scores shape {:?}", score_dims);
    }

    let view = ArrayViewD::from_shape(IxDyn(lm_dims), lm_data)?;
    let (points, channels) = (lm_dims[2], lm_dims[3]);

    let mut slots = HandSlots::default();
    for slot in 0..HAND_SLOTS {
        slots.scores[slot] = score_data[slot];
        slots.landmarks[slot] = (0..points)
            .map(|i| RawLandmark {
                x: view[[0, slot, i, 0]],
                y: view[[0, slot, i, 1]],
                z: if channels > 2 { view[[0, slot, i, 2]] } else { 0.0 },
            })
            .collect();
    }
    Ok(slots)
}

/// Decide qué manos se aceptan en este frame y actualiza el seguimiento.
///
/// Una mano seguida en el frame anterior se mantiene con el umbral de tracking;
/// una mano nueva necesita el umbral de detección.
pub fn select_hands(slots: HandSlots, tracked: &mut [bool; HAND_SLOTS], params: &DetectorParams) -> HandDetections {
    let HandSlots { scores, landmarks: [left, right] } = slots;
    let mut accepted = [None, None];

    for (slot, landmarks) in [left, right].into_iter().enumerate() {
        let threshold = if tracked[slot] {
            params.min_tracking_confidence
        } else {
            params.min_detection_confidence
        };
        let keep = scores[slot] >= threshold && !landmarks.is_empty();
        tracked[slot] = keep;
        if keep {
            accepted[slot] = Some(landmarks);
        }
    }

    let [left, right] = accepted;
    HandDetections { left, right }
}

struct OnnxTrackingSession<'a> {
    detector: &'a OnnxHandDetector,
    tracked: [bool; HAND_SLOTS],
}

impl HandTrackingSession for OnnxTrackingSession<'_> {
    fn detect(&mut self, frame: &RgbImage) -> DomainResult<HandDetections> {
        match self.detector.infer(frame) {
            Ok(slots) => Ok(select_hands(slots, &mut self.tracked, &self.detector.params)),
            Err(e) => {
                // Tras un fallo se pierde el seguimiento.
                self.tracked = [false; HAND_SLOTS];
                Err(DomainError::OperationFailed(format!("hand detector: {}", e)))
            }
        }
    }
}

impl HandDetectorPort for OnnxHandDetector {
    fn start_session(&self) -> Box<dyn HandTrackingSession + '_> {
        Box::new(OnnxTrackingSession { detector: self, tracked: [false; HAND_SLOTS] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(left: f32, right: f32) -> HandSlots {
        let hand = vec![RawLandmark { x: 0.5, y: 0.5, z: 0.0 }; 21];
        HandSlots { scores: [left, right], landmarks: [hand.clone(), hand] }
    }

    #[test]
    fn detection_threshold_for_new_hands() {
        let params = DetectorParams::default();
        let mut tracked = [false, false];

        let det = select_hands(slots(0.7, 0.3), &mut tracked, &params);
        assert!(det.left.is_some());
        assert!(det.right.is_none());
        assert_eq!(tracked, [true, false]);
    }

    #[test]
    fn tracked_hands_use_tracking_threshold() {
        let params = DetectorParams {
            min_detection_confidence: 0.8,
            min_tracking_confidence: 0.4,
            ..DetectorParams::default()
        };
        let mut tracked = [false, false];

        // 0.6 no basta para detectar una mano nueva...
        assert_eq!(select_hands(slots(0.6, 0.0), &mut tracked, &params).hand_count(), 0);
        // ...pero sí para mantener una que ya estaba seguida.
        assert_eq!(select_hands(slots(0.9, 0.0), &mut tracked, &params).hand_count(), 1);
        assert_eq!(select_hands(slots(0.6, 0.0), &mut tracked, &params).hand_count(), 1);
        assert_eq!(select_hands(slots(0.3, 0.0), &mut tracked, &params).hand_count(), 0);
        assert_eq!(tracked, [false, false]);
    }

    #[test]
    fn decodes_model_tensors() {
        let dims = [1, 2, 21, 3];
        let data: Vec<f32> = (0..2 * 21 * 3).map(|i| i as f32 / 1000.0).collect();
        let slots = decode_hand_slots(&dims, &data, &[1, 2], &[0.9, 0.1]).unwrap();

        assert_eq!(slots.scores, [0.9, 0.1]);
        assert_eq!(slots.landmarks[0].len(), 21);
        assert_eq!(slots.landmarks[0][1], RawLandmark { x: 0.003, y: 0.004, z: 0.005 });
        // Slot derecho empieza tras 21*3 valores.
        assert_eq!(slots.landmarks[1][0].x, 0.063);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(decode_hand_slots(&[1, 63], &[0.0; 63], &[1, 2], &[0.5, 0.5]).is_err());
        assert!(decode_hand_slots(&[1, 2, 21, 3], &[0.0; 126], &[1, 1], &[0.5]).is_err());
    }
}
