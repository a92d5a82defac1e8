use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::domain::video::VideoInfo;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    #[serde(default)]
    tags: Option<ProbeTags>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

/// "30000/1001" o "29.97" -> fps. `0/0` y valores no positivos -> `None`.
pub fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

/// Interpreta la salida JSON de ffprobe. `None` si no hay stream de vídeo usable.
///
/// ffmpeg aplica la rotación del contenedor al decodificar, así que con 90/270
/// grados el frame entregado tiene ancho y alto intercambiados.
pub fn parse_probe_json(json: &str) -> Result<Option<VideoInfo>> {
    let out: ProbeOutput = serde_json::from_str(json).context("invalid ffprobe JSON")?;
    let Some(stream) = out.streams.into_iter().next() else {
        return Ok(None);
    };

    let (Some(mut width), Some(mut height)) = (stream.width, stream.height) else {
        return Ok(None);
    };
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let rotation = stream
        .side_data_list
        .iter()
        .find_map(|sd| sd.rotation)
        .or_else(|| stream.tags.as_ref()?.rotate.as_deref()?.trim().parse().ok())
        .unwrap_or(0.0);
    if (rotation.round() as i64).rem_euclid(180) == 90 {
        std::mem::swap(&mut width, &mut height);
    }

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

    Ok(Some(VideoInfo { width, height, fps }))
}

/// Ejecuta ffprobe. `Ok(None)` si ffprobe rechaza el fichero; `Err` si no se
/// puede lanzar el binario.
pub fn probe_video(ffprobe_bin: &str, path: &Path) -> Result<Option<VideoInfo>> {
    let output = Command::new(ffprobe_bin)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_streams",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| anyhow!("failed to run {}: {}", ffprobe_bin, e))?;

    if !output.status.success() {
        tracing::warn!(
            "ffprobe rejected {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(None);
    }

    parse_probe_json(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rates() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("0/1"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn probe_json_basic() {
        let json = r#"{"programs": [], "streams": [
            {"width": 640, "height": 480, "r_frame_rate": "30/1", "avg_frame_rate": "30/1"}
        ]}"#;
        let info = parse_probe_json(json).unwrap().unwrap();
        assert_eq!(info, VideoInfo { width: 640, height: 480, fps: Some(30.0) });
    }

    #[test]
    fn probe_json_falls_back_to_r_frame_rate() {
        let json = r#"{"streams": [{"width": 320, "height": 240, "avg_frame_rate": "0/0", "r_frame_rate": "15/1"}]}"#;
        let info = parse_probe_json(json).unwrap().unwrap();
        assert_eq!(info.fps, Some(15.0));

        let json = r#"{"streams": [{"width": 320, "height": 240, "avg_frame_rate": "0/0"}]}"#;
        assert_eq!(parse_probe_json(json).unwrap().unwrap().fps, None);
    }

    #[test]
    fn probe_json_swaps_dims_for_portrait_rotation() {
        let side_data = r#"{"streams": [{"width": 1920, "height": 1080, "avg_frame_rate": "30/1",
            "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}]}]}"#;
        let info = parse_probe_json(side_data).unwrap().unwrap();
        assert_eq!((info.width, info.height), (1080, 1920));

        let tag = r#"{"streams": [{"width": 1920, "height": 1080, "tags": {"rotate": "180"}}]}"#;
        let info = parse_probe_json(tag).unwrap().unwrap();
        assert_eq!((info.width, info.height), (1920, 1080));
    }

    #[test]
    fn probe_json_without_video_stream() {
        assert!(parse_probe_json(r#"{"streams": []}"#).unwrap().is_none());
        assert!(parse_probe_json(r#"{}"#).unwrap().is_none());
        assert!(parse_probe_json(r#"{"streams": [{"width": 0, "height": 0}]}"#).unwrap().is_none());
        assert!(parse_probe_json("not json").is_err());
    }
}
