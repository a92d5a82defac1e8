//! Dobles de prueba para los puertos del pipeline.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use crate::application::ports::{
    FrameSource, HandDetectorPort, HandTrackingSession, SentenceGeneratorPort, SignClassifierPort,
    VideoDecoderPort,
};
use crate::domain::{
    errors::{DomainError, DomainResult},
    landmarks::{FeatureVector, HandDetections, RawLandmark, HAND_LANDMARKS},
    prediction::FramePrediction,
    video::{VideoInfo, VideoUpload},
    vocabulary::Vocabulary,
};

const MARKER: Rgb<u8> = Rgb([255, 0, 0]);

/// Frame marcado: el detector falso encuentra una mano en él.
pub fn hand_frame() -> RgbImage {
    let mut img = RgbImage::new(8, 8);
    img.put_pixel(0, 0, MARKER);
    img
}

pub fn plain_frame() -> RgbImage {
    RgbImage::new(8, 8)
}

fn fake_hand() -> Vec<RawLandmark> {
    (0..HAND_LANDMARKS)
        .map(|i| RawLandmark { x: 0.2 + i as f32 * 0.02, y: 0.3 + i as f32 * 0.01, z: 0.0 })
        .collect()
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

pub struct ScriptedDetector {
    failing_calls: Vec<usize>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self { failing_calls: Vec::new() }
    }

    /// Falla en las llamadas indicadas (0-based, por sesión).
    pub fn failing_on(calls: &[usize]) -> Self {
        Self { failing_calls: calls.to_vec() }
    }
}

struct ScriptedSession<'a> {
    detector: &'a ScriptedDetector,
    calls: usize,
}

impl HandTrackingSession for ScriptedSession<'_> {
    fn detect(&mut self, frame: &RgbImage) -> DomainResult<HandDetections> {
        let call = self.calls;
        self.calls += 1;
        if self.detector.failing_calls.contains(&call) {
            return Err(DomainError::OperationFailed("malformed frame".into()));
        }
        if *frame.get_pixel(0, 0) == MARKER {
            Ok(HandDetections { left: Some(fake_hand()), right: None })
        } else {
            Ok(HandDetections::none())
        }
    }
}

impl HandDetectorPort for ScriptedDetector {
    fn start_session(&self) -> Box<dyn HandTrackingSession + '_> {
        Box::new(ScriptedSession { detector: self, calls: 0 })
    }
}

// ---------------------------------------------------------------------------
// Clasificador
// ---------------------------------------------------------------------------

/// Devuelve las predicciones del guion en orden, una por llamada.
pub struct ScriptedClassifier {
    vocabulary: Vocabulary,
    script: Mutex<VecDeque<FramePrediction>>,
    fail: bool,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<FramePrediction>) -> Self {
        Self { vocabulary: Vocabulary::default_signs(), script: Mutex::new(script.into()), fail: false }
    }

    /// `(label, confidence, repeticiones)`
    pub fn from_runs(runs: &[(&str, f32, usize)]) -> Self {
        let script = runs
            .iter()
            .flat_map(|&(label, conf, n)| std::iter::repeat(FramePrediction::new(label, conf)).take(n))
            .collect();
        Self::new(script)
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(Vec::new()) }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl SignClassifierPort for ScriptedClassifier {
    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn classify(&self, _features: &FeatureVector) -> DomainResult<FramePrediction> {
        if self.fail {
            return Err(DomainError::OperationFailed("session run failed".into()));
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DomainError::OperationFailed("classifier script exhausted".into()))
    }
}

// ---------------------------------------------------------------------------
// Decodificador
// ---------------------------------------------------------------------------

enum DecoderMode {
    Frames,
    Undecodable,
    Broken,
}

pub struct FakeDecoder {
    hands: Vec<bool>,
    fps: Option<f64>,
    error_after: Option<usize>,
    mode: DecoderMode,
    opened: AtomicUsize,
}

impl FakeDecoder {
    /// Un frame por elemento; `true` = frame con mano.
    pub fn new(hands: Vec<bool>, fps: Option<f64>) -> Self {
        Self { hands, fps, error_after: None, mode: DecoderMode::Frames, opened: AtomicUsize::new(0) }
    }

    pub fn with_hands(frames: usize, fps: f64) -> Self {
        Self::new(vec![true; frames], Some(fps))
    }

    pub fn undecodable() -> Self {
        Self { mode: DecoderMode::Undecodable, ..Self::new(Vec::new(), None) }
    }

    pub fn broken() -> Self {
        Self { mode: DecoderMode::Broken, ..Self::new(Vec::new(), None) }
    }

    pub fn error_after(mut self, frames: usize) -> Self {
        self.error_after = Some(frames);
        self
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

struct FakeSource {
    info: VideoInfo,
    frames: VecDeque<RgbImage>,
    error_after: Option<usize>,
    served: usize,
}

impl FrameSource for FakeSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> DomainResult<Option<RgbImage>> {
        if self.error_after == Some(self.served) {
            return Err(DomainError::OperationFailed("corrupt packet".into()));
        }
        self.served += 1;
        Ok(self.frames.pop_front())
    }
}

impl VideoDecoderPort for FakeDecoder {
    fn open(&self, _upload: &VideoUpload) -> DomainResult<Option<Box<dyn FrameSource>>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            DecoderMode::Undecodable => Ok(None),
            DecoderMode::Broken => Err(DomainError::OperationFailed("ffmpeg not installed".into())),
            DecoderMode::Frames => {
                let frames = self
                    .hands
                    .iter()
                    .map(|&h| if h { hand_frame() } else { plain_frame() })
                    .collect();
                Ok(Some(Box::new(FakeSource {
                    info: VideoInfo { width: 8, height: 8, fps: self.fps },
                    frames,
                    error_after: self.error_after,
                    served: 0,
                })))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Generador de frases
// ---------------------------------------------------------------------------

enum Reply {
    Text(String),
    Fail,
    Hang,
}

pub struct StubGenerator {
    reply: Reply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StubGenerator {
    fn with(reply: Reply) -> Self {
        Self { reply, calls: AtomicUsize::new(0), last_prompt: Mutex::new(None) }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Text(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(Reply::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(Reply::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl SentenceGeneratorPort for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Fail => Err(DomainError::OperationFailed("quota exceeded".into())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("too late".into())
            }
        }
    }
}
