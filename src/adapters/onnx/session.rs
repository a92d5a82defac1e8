use anyhow::{Context, Result};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use std::fs;

/// Crea una sesión ONNX. CUDA es opcional: si está disponible se registra,
/// si no continuamos en CPU.
pub fn build_session(path: &str, intra_threads: usize) -> Result<Session> {
    let mut builder = Session::builder()?.with_intra_threads(intra_threads.max(1))?;

    let cuda = CUDAExecutionProvider::default().build();
    if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
        builder = builder_with_cuda;
    }

    let model_bytes = fs::read(path).with_context(|| format!("reading model {}", path))?;
    let session = builder
        .commit_from_memory(&model_bytes)
        .with_context(|| format!("loading ONNX model {}", path))?;

    Ok(session)
}
