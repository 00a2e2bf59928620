//! Thumbnail extraction.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dream_models::{notify_error, notify_info, Stage, StageObserver};
use tracing::info;

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::filter_scale;
use crate::toolchain::MediaToolchain;

/// Thumbnail file name prefix.
pub const THUMBNAIL_PREFIX: &str = "thumb_";
/// Thumbnail image extension.
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Derive the thumbnail file name for a video.
///
/// The video stem keeps names traceable to their source; the millisecond
/// timestamp separates repeated runs over the same file.
pub fn thumbnail_filename(video_path: &Path, timestamp_millis: i64) -> String {
    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    format!(
        "{}{}_{}.{}",
        THUMBNAIL_PREFIX, stem, timestamp_millis, THUMBNAIL_EXTENSION
    )
}

/// Extracts a single representative frame from a video.
#[derive(Clone)]
pub struct ThumbnailExtractor {
    toolchain: Arc<dyn MediaToolchain>,
}

impl ThumbnailExtractor {
    pub fn new(toolchain: Arc<dyn MediaToolchain>) -> Self {
        Self { toolchain }
    }

    /// Write the first decodable frame of `video_path` into `output_dir`.
    ///
    /// Returns only the file name so callers can build public references
    /// without knowing the storage layout.
    pub async fn extract(
        &self,
        video_path: &Path,
        output_dir: &Path,
        observer: Option<&dyn StageObserver>,
    ) -> MediaResult<String> {
        match self.extract_inner(video_path, output_dir).await {
            Ok(filename) => {
                notify_info(
                    observer,
                    Stage::Thumbnail,
                    &format!("Generated thumbnail {}", filename),
                );
                Ok(filename)
            }
            Err(e) => {
                let detail = match e.stderr() {
                    Some(stderr) => format!("{}: {}", e, stderr),
                    None => e.to_string(),
                };
                notify_error(
                    observer,
                    Stage::Thumbnail,
                    &format!("Error generating thumbnail for {}: {}", video_path.display(), detail),
                );
                Err(e)
            }
        }
    }

    async fn extract_inner(&self, video_path: &Path, output_dir: &Path) -> MediaResult<String> {
        let report = self.toolchain.probe(video_path).await?;
        let stream = report
            .first_video_stream()
            .ok_or_else(|| MediaError::NoVideoStream(video_path.to_path_buf()))?;

        tokio::fs::create_dir_all(output_dir).await?;

        let filename = thumbnail_filename(video_path, Utc::now().timestamp_millis());
        let output_path = output_dir.join(&filename);

        let mut cmd = FfmpegCommand::new(video_path, &output_path).single_frame();
        if let Some(size) = stream.frame_size() {
            cmd = cmd.video_filter(filter_scale(size.width, size.height));
        }

        self.toolchain.run(&cmd).await?;

        info!(
            video = %video_path.display(),
            thumbnail = %output_path.display(),
            "Thumbnail generated"
        );
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeReport, StreamInfo};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeToolchain {
        streams: Vec<StreamInfo>,
        fail_run: bool,
        commands: Mutex<Vec<FfmpegCommand>>,
    }

    impl FakeToolchain {
        fn new(streams: Vec<StreamInfo>, fail_run: bool) -> Arc<Self> {
            Arc::new(Self {
                streams,
                fail_run,
                commands: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl MediaToolchain for FakeToolchain {
        async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
            self.commands.lock().unwrap().push(cmd.clone());
            if self.fail_run {
                return Err(MediaError::ffmpeg_failed(
                    "FFmpeg exited with non-zero status",
                    Some("Invalid data found when processing input".to_string()),
                    Some(1),
                ));
            }
            Ok(())
        }

        async fn probe(&self, _path: &Path) -> MediaResult<ProbeReport> {
            Ok(ProbeReport {
                streams: self.streams.clone(),
            })
        }
    }

    fn video_stream() -> StreamInfo {
        StreamInfo {
            codec_type: "video".to_string(),
            codec_name: Some("h264".to_string()),
            width: Some(100),
            height: Some(80),
            avg_frame_rate: None,
        }
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl StageObserver for Events {
        fn info(&self, _stage: Stage, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }

        fn error(&self, _stage: Stage, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn test_thumbnail_filename() {
        let name = thumbnail_filename(Path::new("/videos/g1.mp4"), 1700000000000);
        assert_eq!(name, "thumb_g1_1700000000000.png");
    }

    #[tokio::test]
    async fn test_extract_single_scaled_frame() {
        let dir = TempDir::new().unwrap();
        let thumbs = dir.path().join("thumbs");
        let toolchain = FakeToolchain::new(vec![video_stream()], false);
        let extractor = ThumbnailExtractor::new(toolchain.clone());

        let filename = extractor
            .extract(Path::new("video.mp4"), &thumbs, None)
            .await
            .unwrap();

        assert!(filename.starts_with("thumb_video_"));
        assert!(filename.ends_with(".png"));
        assert!(thumbs.is_dir());

        let commands = toolchain.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].output(), thumbs.join(&filename).as_path());
        assert_eq!(commands[0].output_value("-frames:v"), Some("1"));
        assert_eq!(commands[0].output_value("-vf"), Some("scale=100:80"));
    }

    #[tokio::test]
    async fn test_no_video_stream_skips_extraction() {
        let dir = TempDir::new().unwrap();
        let audio = StreamInfo {
            codec_type: "audio".to_string(),
            ..Default::default()
        };
        let toolchain = FakeToolchain::new(vec![audio], false);
        let extractor = ThumbnailExtractor::new(toolchain.clone());

        let err = extractor
            .extract(Path::new("video.mp4"), dir.path(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::NoVideoStream(_)));
        assert!(toolchain.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tool_failure_reports_stderr() {
        let dir = TempDir::new().unwrap();
        let extractor = ThumbnailExtractor::new(FakeToolchain::new(vec![video_stream()], true));
        let events = Events::default();

        let err = extractor
            .extract(Path::new("video.mp4"), dir.path(), Some(&events))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
        let events = events.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].starts_with("Error generating thumbnail"));
        assert!(events[0].contains("Invalid data found"));
    }
}
