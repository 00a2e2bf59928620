//! FFprobe stream information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// Streams reported by FFprobe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

/// One stream in the container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// "video", "audio", "data", ...
    #[serde(default)]
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avg_frame_rate: Option<String>,
}

/// Pixel dimensions of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl StreamInfo {
    pub fn is_video(&self) -> bool {
        self.codec_type == "video"
    }

    /// Frame size, when FFprobe reported both dimensions.
    pub fn frame_size(&self) -> Option<FrameSize> {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(FrameSize { width, height })
            }
            _ => None,
        }
    }
}

impl ProbeReport {
    /// First stream of video type.
    pub fn first_video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.is_video())
    }
}

/// Probe a media file for stream information.
///
/// With a `timeout`, FFprobe is killed once it runs longer than that.
pub async fn probe_streams(
    path: impl AsRef<Path>,
    timeout: Option<Duration>,
) -> MediaResult<ProbeReport> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let child = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_streams"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(
                    path = %path.display(),
                    timeout_secs = limit.as_secs(),
                    "ffprobe exceeded its time limit"
                );
                return Err(MediaError::Timeout(limit.as_secs()));
            }
        },
        None => child.await?,
    };

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: format!("FFprobe failed on {}", path.display()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).trim().to_string()),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse FFprobe's JSON output.
pub fn parse_probe_output(stdout: &[u8]) -> MediaResult<ProbeReport> {
    Ok(serde_json::from_slice(stdout)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output() {
        let json = br#"{
            "streams": [
                {"index": 0, "codec_type": "audio", "codec_name": "aac"},
                {"index": 1, "codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720}
            ],
            "format": {"duration": "5.041667", "size": "123456"}
        }"#;

        let report = parse_probe_output(json).unwrap();
        let video = report.first_video_stream().unwrap();
        assert_eq!(video.codec_name.as_deref(), Some("h264"));
        assert_eq!(
            video.frame_size(),
            Some(FrameSize {
                width: 1280,
                height: 720
            })
        );
    }

    #[test]
    fn test_audio_only_has_no_video_stream() {
        let json = br#"{"streams": [{"codec_type": "audio"}]}"#;
        let report = parse_probe_output(json).unwrap();
        assert!(report.first_video_stream().is_none());
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let err = probe_streams("/nonexistent/clip.mp4", Some(Duration::from_secs(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
