use image::RgbImage;
use tracing::{trace, warn};

use crate::application::ports::HandTrackingSession;
use crate::domain::landmarks::{build_feature_vector, FeatureVector};

/// Frame -> vector de características, o `None` si no hay manos.
#[derive(Debug, Clone, Copy)]
pub struct PoseExtractor {
    margin_px: f32,
}

impl PoseExtractor {
    pub fn new(margin_px: f32) -> Self {
        Self { margin_px }
    }

    /// Un fallo del detector cuenta como "sin manos" para ese frame y nunca
    /// interrumpe el vídeo.
    pub fn extract(&self, session: &mut dyn HandTrackingSession, frame: &RgbImage) -> Option<FeatureVector> {
        match session.detect(frame) {
            Ok(detections) => {
                trace!(hands = detections.hand_count());
                build_feature_vector(&detections, frame.width(), frame.height(), self.margin_px)
            }
            Err(e) => {
                warn!("Error extracting landmarks: {}", e);
                None
            }
        }
    }
}
