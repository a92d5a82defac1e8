use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "sign_classifier"
    pub onnx_path: String,  // filesystem path
}

/// Parámetros del detector holístico de manos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub input_size: u32,                // lado de la imagen cuadrada de entrada
    pub min_detection_confidence: f32,  // 0..1, mano nueva
    pub min_tracking_confidence: f32,   // 0..1, mano ya seguida en el frame anterior
    pub bbox_margin_px: f32,            // margen de la caja de la mano
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            input_size: 256,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            bbox_margin_px: 20.0,
        }
    }
}
