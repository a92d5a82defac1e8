use serde::{Deserialize, Serialize};

/// Landmarks por mano que devuelve el detector (muñeca + 4 por dedo).
pub const HAND_LANDMARKS: usize = 21;
/// Puntos por vector de características: dos manos completas.
pub const FEATURE_POINTS: usize = 2 * HAND_LANDMARKS;

/// Punto 2D normalizado a la caja de la mano, en [0,1]x[0,1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

/// Landmark crudo del detector, normalizado al frame completo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawLandmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Manos detectadas en un frame. `None` = mano no detectada.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandDetections {
    pub left: Option<Vec<RawLandmark>>,
    pub right: Option<Vec<RawLandmark>>,
}

impl HandDetections {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hand_count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }
}

/// Estado de pose de un frame: exactamente 42 puntos (izquierda y luego derecha),
/// rellenado con (0,0) cuando falta una mano o algún landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([LandmarkPoint; FEATURE_POINTS]);

impl FeatureVector {
    /// Devuelve `None` si no hay ningún punto (frame sin manos).
    pub fn from_points(points: Vec<LandmarkPoint>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut out = [LandmarkPoint::default(); FEATURE_POINTS];
        for (slot, point) in out.iter_mut().zip(points) {
            *slot = point;
        }
        Some(Self(out))
    }

    pub fn points(&self) -> &[LandmarkPoint; FEATURE_POINTS] {
        &self.0
    }

    /// Layout `[x0, y0, x1, y1, ...]`, el que espera el clasificador `[42, 2]`.
    pub fn to_flat(&self) -> Vec<f32> {
        self.points().iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

/// Renormaliza los landmarks de una mano a su caja envolvente en píxeles,
/// ampliada `margin_px` por cada lado y recortada a los bordes del frame.
/// Una caja degenerada (ancho o alto nulo) no aporta puntos.
pub fn normalize_to_hand_box(
    hand: &[RawLandmark],
    image_width: u32,
    image_height: u32,
    margin_px: f32,
) -> Vec<LandmarkPoint> {
    if hand.is_empty() || image_width == 0 || image_height == 0 {
        return Vec::new();
    }

    let w = image_width as f32;
    let h = image_height as f32;
    let pixels: Vec<(f32, f32)> = hand.iter().map(|lm| (lm.x * w, lm.y * h)).collect();

    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for &(px, py) in &pixels {
        min_x = min_x.min(px);
        max_x = max_x.max(px);
        min_y = min_y.min(py);
        max_y = max_y.max(py);
    }

    let x_min = (min_x - margin_px).max(0.0);
    let x_max = (max_x + margin_px).min(w);
    let y_min = (min_y - margin_px).max(0.0);
    let y_max = (max_y + margin_px).min(h);

    let box_w = x_max - x_min;
    let box_h = y_max - y_min;
    if !(box_w > 0.0 && box_h > 0.0) {
        return Vec::new();
    }

    pixels
        .into_iter()
        .map(|(px, py)| LandmarkPoint {
            x: ((px - x_min) / box_w).clamp(0.0, 1.0),
            y: ((py - y_min) / box_h).clamp(0.0, 1.0),
        })
        .collect()
}

/// Construye el vector de características de un frame (izquierda y luego derecha).
pub fn build_feature_vector(
    detections: &HandDetections,
    image_width: u32,
    image_height: u32,
    margin_px: f32,
) -> Option<FeatureVector> {
    let mut points = Vec::with_capacity(FEATURE_POINTS);
    for hand in [&detections.left, &detections.right].into_iter().flatten() {
        points.extend(normalize_to_hand_box(hand, image_width, image_height, margin_px));
    }
    FeatureVector::from_points(points)
}
