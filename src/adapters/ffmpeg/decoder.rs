use std::io::{BufReader, ErrorKind, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{anyhow, Result};
use image::RgbImage;
use tracing::{debug, info};

use crate::adapters::ffmpeg::{probe::probe_video, staging::StagedVideo};
use crate::application::ports::{FrameSource, VideoDecoderPort};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::video::{VideoInfo, VideoUpload};

/// Configuración de los binarios de ffmpeg.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

/// Decodificador basado en los binarios `ffprobe` + `ffmpeg`.
pub struct FfmpegVideoDecoder {
    cfg: DecoderConfig,
}

impl FfmpegVideoDecoder {
    pub fn new(cfg: DecoderConfig) -> Self {
        Self { cfg }
    }

    fn spawn_rawvideo(&self, staged: &StagedVideo) -> Result<Child> {
        Command::new(&self.cfg.ffmpeg_bin)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(staged.path())
            .args(["-vsync", "passthrough", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("failed to run {}: {}", self.cfg.ffmpeg_bin, e))
    }
}

impl VideoDecoderPort for FfmpegVideoDecoder {
    fn open(&self, upload: &VideoUpload) -> DomainResult<Option<Box<dyn FrameSource>>> {
        let staged = StagedVideo::write(upload)?;

        let info = probe_video(&self.cfg.ffprobe_bin, staged.path())
            .map_err(|e| DomainError::OperationFailed(e.to_string()))?;
        let Some(info) = info else {
            return Ok(None);
        };
        info!("🎞️ Video {}x{} @ {:?} fps", info.width, info.height, info.fps);

        let mut child = self
            .spawn_rawvideo(&staged)
            .map_err(|e| DomainError::OperationFailed(e.to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::OperationFailed("ffmpeg stdout not captured".into()))?;

        let reader = RawFrameReader::new(BufReader::new(stdout), info.width, info.height);
        Ok(Some(Box::new(FfmpegFrameSource { reader, child, info, _staged: staged })))
    }
}

/// Lee frames rgb24 de tamaño fijo de un stream crudo.
pub struct RawFrameReader<R> {
    inner: R,
    width: u32,
    height: u32,
    finished: bool,
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(inner: R, width: u32, height: u32) -> Self {
        Self { inner, width, height, finished: false }
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Un frame incompleto al final del stream se descarta.
    pub fn read_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.frame_len()];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => RgbImage::from_raw(self.width, self.height, buf)
                .map(Some)
                .ok_or_else(|| anyhow!("frame buffer does not match {}x{}", self.width, self.height)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e.into())
            }
        }
    }
}

/// Stream de frames de un proceso ffmpeg. Al soltarse mata el proceso y,
/// después, borra el fichero temporal (orden de declaración de campos).
struct FfmpegFrameSource {
    reader: RawFrameReader<BufReader<ChildStdout>>,
    child: Child,
    info: VideoInfo,
    _staged: StagedVideo,
}

impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> DomainResult<Option<RgbImage>> {
        self.reader
            .read_frame()
            .map_err(|e| DomainError::OperationFailed(format!("reading frame: {}", e)))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        // Si ya terminó, kill falla sin efecto; wait evita procesos zombi.
        let _ = self.child.kill();
        match self.child.wait() {
            Ok(status) => debug!("ffmpeg exited: {}", status),
            Err(e) => debug!("ffmpeg wait failed: {}", e),
        }
    }
}
