use std::path::Path;

use super::errors::{DomainError, DomainResult};

pub const DEFAULT_EXTENSION: &str = "mp4";

/// Vídeo subido por el cliente, ya validado.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    filename: String,
    bytes: Vec<u8>,
}

impl VideoUpload {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> DomainResult<Self> {
        let filename = filename
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .ok_or_else(|| DomainError::InvalidInput("No filename provided".into()))?;
        if bytes.is_empty() {
            return Err(DomainError::InvalidInput("Empty file uploaded".into()));
        }
        Ok(Self { filename, bytes })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Extensión del nombre original (sin punto), `mp4` si no tiene.
    pub fn extension(&self) -> &str {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or(DEFAULT_EXTENSION)
    }
}

/// Metadatos del stream de vídeo. `fps` es `None` si el contenedor no lo declara.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
}

impl VideoInfo {
    pub fn fps_or(&self, default_fps: f64) -> f64 {
        self.fps.filter(|f| f.is_finite() && *f > 0.0).unwrap_or(default_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_filename_and_empty_body() {
        let err = VideoUpload::new(None, vec![1, 2, 3]).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: No filename provided");

        let err = VideoUpload::new(Some("  ".into()), vec![1]).unwrap_err();
        assert!(err.is_client_error());

        let err = VideoUpload::new(Some("clip.mp4".into()), Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: Empty file uploaded");
    }

    #[test]
    fn extension_defaults_to_mp4() {
        let up = |name: &str| VideoUpload::new(Some(name.into()), vec![0]).unwrap();
        assert_eq!(up("clip.mov").extension(), "mov");
        assert_eq!(up("clip.WEBM").extension(), "WEBM");
        assert_eq!(up("recording").extension(), "mp4");
        assert_eq!(up("weird.m p4").extension(), "mp4");
    }

    #[test]
    fn fps_falls_back_when_unknown() {
        let info = |fps| VideoInfo { width: 10, height: 10, fps };
        assert_eq!(info(Some(25.0)).fps_or(30.0), 25.0);
        assert_eq!(info(None).fps_or(30.0), 30.0);
        assert_eq!(info(Some(0.0)).fps_or(30.0), 30.0);
        assert_eq!(info(Some(f64::INFINITY)).fps_or(30.0), 30.0);
    }
}
