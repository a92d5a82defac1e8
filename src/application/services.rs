use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::{
    application::{
        composer::SentenceComposer,
        ports::{HandDetectorPort, SignClassifierPort, VideoDecoderPort},
        pose_extractor::PoseExtractor,
    },
    domain::{
        errors::{DomainError, DomainResult},
        pipeline::PipelineStage,
        prediction::FramePrediction,
        recognition::RecognitionResult,
        segmentation::{segment, SegmentParams},
        video::VideoUpload,
    },
};

/// Estado de modelos compartido por todas las peticiones.
/// Se construye una vez al arrancar y después solo se lee.
pub struct RecognitionContext {
    detector: Arc<dyn HandDetectorPort>,
    classifier: Arc<dyn SignClassifierPort>,
}

impl RecognitionContext {
    pub fn new(detector: Arc<dyn HandDetectorPort>, classifier: Arc<dyn SignClassifierPort>) -> Self {
        Self { detector, classifier }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.classifier.vocabulary().len()
    }
}

/// Ajustes del pipeline por petición.
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub segment: SegmentParams,
    pub default_fps: f64,
    pub bbox_margin_px: f32,
    pub classifier_batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            segment: SegmentParams::default(),
            default_fps: 30.0,
            bbox_margin_px: 20.0,
            classifier_batch_size: 1,
        }
    }
}

/// Resultado de la parte bloqueante (decodificar, extraer, clasificar).
struct FrameAnalysis {
    predictions: Vec<FramePrediction>,
    fps: f64,
}

#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub models_loaded: bool,
    pub vocabulary_size: usize,
    pub generator: String,
}

/// Orquestador del pipeline vídeo -> signos -> frase.
pub struct RecognitionService {
    context: Arc<RecognitionContext>,
    decoder: Arc<dyn VideoDecoderPort>,
    composer: SentenceComposer,
    options: PipelineOptions,
    next_request: AtomicU64,
}

impl RecognitionService {
    pub fn new(
        context: Arc<RecognitionContext>,
        decoder: Arc<dyn VideoDecoderPort>,
        composer: SentenceComposer,
        options: PipelineOptions,
    ) -> Self {
        Self { context, decoder, composer, options, next_request: AtomicU64::new(1) }
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            models_loaded: true,
            vocabulary_size: self.context.vocabulary_size(),
            generator: self.composer.generator_name().to_string(),
        }
    }

    /// Ejecuta el pipeline completo sobre un vídeo.
    ///
    /// Vídeo no decodificable, cero manos y fallo del generador degradan el
    /// resultado; solo los fallos internos devuelven `Err`.
    pub async fn recognize(&self, upload: VideoUpload) -> DomainResult<RecognitionResult> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("recognize", request_id, file = %upload.filename());

        async move {
            debug!(stage = %PipelineStage::Received, bytes = upload.bytes().len());

            let context = self.context.clone();
            let decoder = self.decoder.clone();
            let options = self.options;
            let worker_span = tracing::Span::current();

            // Decodificación e inferencia son bloqueantes: fuera del runtime async.
            let analysis = tokio::task::spawn_blocking(move || {
                let _guard = worker_span.enter();
                analyze_frames(&context, decoder.as_ref(), &options, &upload)
            })
            .await
            .map_err(|e| {
                DomainError::OperationFailed(format!("frame worker aborted: {}", e))
            })
            .and_then(|r| r);

            let analysis = match analysis {
                Ok(a) => a,
                Err(e) => {
                    error!(stage = %PipelineStage::Failed, "❌ Error processing video: {}", e);
                    return Err(e);
                }
            };

            if analysis.predictions.is_empty() {
                info!("🖐️ No hand detected in video");
                debug!(stage = %PipelineStage::Responding);
                return Ok(RecognitionResult::no_hands(analysis.fps));
            }

            debug!(stage = %PipelineStage::Segmenting, window_fps = analysis.fps);
            let signs = segment(&analysis.predictions, analysis.fps, &self.options.segment);

            debug!(stage = %PipelineStage::Composing, signs = signs.len());
            let sentence = self.composer.compose(&signs).await;

            info!("✅ Predicted signs: {:?} -> \"{}\"", &*signs, sentence);
            let result = RecognitionResult::recognized(
                signs,
                sentence,
                analysis.predictions.len(),
                analysis.fps,
            );
            debug!(stage = %PipelineStage::Responding, outcome = ?result.outcome());
            Ok(result)
        }
        .instrument(span)
        .await
    }
}

fn analyze_frames(
    context: &RecognitionContext,
    decoder: &dyn VideoDecoderPort,
    options: &PipelineOptions,
    upload: &VideoUpload,
) -> DomainResult<FrameAnalysis> {
    debug!(stage = %PipelineStage::Decoding);
    let Some(mut source) = decoder.open(upload).map_err(|e| e.at(PipelineStage::Decoding))? else {
        warn!("Video could not be decoded, treating it as zero frames");
        return Ok(FrameAnalysis { predictions: Vec::new(), fps: options.default_fps });
    };
    let fps = source.info().fps_or(options.default_fps);

    debug!(stage = %PipelineStage::Extracting, fps);
    let extractor = PoseExtractor::new(options.bbox_margin_px);
    let mut session = context.detector.start_session();
    let mut features = Vec::new();
    let mut frame_count = 0usize;

    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                frame_count += 1;
                if let Some(fv) = extractor.extract(session.as_mut(), &frame) {
                    features.push(fv);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Frame read stopped after {} frames: {}", frame_count, e);
                break;
            }
        }
    }
    // Libera el proceso decodificador y el fichero temporal cuanto antes.
    drop(session);
    drop(source);
    info!("Total frames: {}, Frames with hands: {}", frame_count, features.len());

    debug!(stage = %PipelineStage::Classifying);
    let batch = options.classifier_batch_size.max(1);
    let mut predictions = Vec::with_capacity(features.len());
    for chunk in features.chunks(batch) {
        let batch_predictions = context
            .classifier
            .classify_batch(chunk)
            .map_err(|e| e.at(PipelineStage::Classifying))?;
        predictions.extend(batch_predictions);
    }

    Ok(FrameAnalysis { predictions, fps })
}
