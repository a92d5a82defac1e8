mod adapters;
mod application;
mod config;
mod domain;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::adapters::{
    ffmpeg::decoder::FfmpegVideoDecoder,
    http::{router, state::HttpState},
    llm::build_generator,
    onnx::{hand_detector::OnnxHandDetector, model_catalog::OnnxModelCatalog, sign_classifier::OnnxSignClassifier},
};
use crate::application::{
    composer::SentenceComposer,
    ports::ModelCatalogPort,
    services::{RecognitionContext, RecognitionService},
};
use crate::config::AppConfig;
use crate::domain::vocabulary::Vocabulary;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logs (RUST_LOG=info por defecto)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 2. Configuración
    let cfg = AppConfig::load()?;

    // 3. Modelos: validar ficheros y crear sesiones una sola vez
    tracing::info!("🔧 Loading models...");
    let catalog = OnnxModelCatalog::new();
    catalog.validate_model(&cfg.detector_model()).await?;
    catalog.validate_model(&cfg.classifier_model()).await?;

    let vocabulary = match &cfg.models.labels_path {
        Some(path) => Vocabulary::from_file(path)?,
        None => Vocabulary::default_signs(),
    };

    let detector = OnnxHandDetector::load(
        &cfg.models.detector_path,
        cfg.detector_params(),
        cfg.models.intra_threads,
    )
    .context("loading hand landmark model")?;
    let classifier = OnnxSignClassifier::load(&cfg.models.classifier_path, vocabulary, cfg.models.intra_threads)
        .context("loading sign classifier")?;
    let context = Arc::new(RecognitionContext::new(Arc::new(detector), Arc::new(classifier)));

    // 4. Servicios
    let decoder = Arc::new(FfmpegVideoDecoder::new(cfg.decoder_config()));
    let generator = build_generator(&cfg.llm)?;
    let composer = SentenceComposer::new(generator, Duration::from_secs(cfg.llm.timeout_secs));
    let recognition = Arc::new(RecognitionService::new(context, decoder, composer, cfg.pipeline_options()));

    // 5. Servidor
    let app = router(HttpState { recognition }, cfg.server.max_upload_bytes);
    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Sign2Text server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}
