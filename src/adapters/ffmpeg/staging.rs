use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::video::VideoUpload;

/// Copia temporal del vídeo subido. Se borra al soltarse, pase lo que pase
/// con el resto del pipeline (incluido un panic del worker).
pub struct StagedVideo {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl StagedVideo {
    pub fn write(upload: &VideoUpload) -> DomainResult<Self> {
        let io_err = |e: std::io::Error| DomainError::OperationFailed(format!("staging upload: {}", e));

        let mut file = tempfile::Builder::new()
            .prefix("sign2text-")
            .suffix(&format!(".{}", upload.extension()))
            .tempfile()
            .map_err(io_err)?;
        file.write_all(upload.bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;

        let path = file.path().to_path_buf();
        info!("💾 Video saved to: {}", path.display());
        Ok(Self { file: Some(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedVideo {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            match file.close() {
                Ok(()) => info!("🧹 Cleaned up temp file: {}", self.path.display()),
                Err(e) => warn!("Could not delete temp file {}: {}", self.path.display(), e),
            }
        }
    }
}
