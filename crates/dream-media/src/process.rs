//! Color/noise correction of downloaded videos.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dream_models::{notify_error, notify_info, FilterSettings, Stage, StageObserver};
use tracing::{debug, info};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::filters::FilterChain;
use crate::fs_utils::{remove_quietly, replace_file, temp_sibling};
use crate::toolchain::MediaToolchain;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 18;
/// Pixel format every player can decode
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Applies the correction chain and swaps the result in place.
#[derive(Clone)]
pub struct VideoProcessor {
    toolchain: Arc<dyn MediaToolchain>,
}

impl VideoProcessor {
    pub fn new(toolchain: Arc<dyn MediaToolchain>) -> Self {
        Self { toolchain }
    }

    /// Build the encode command for `raw_path` writing to `output`.
    pub fn build_command(
        raw_path: &Path,
        output: &Path,
        chain: &FilterChain,
    ) -> FfmpegCommand {
        FfmpegCommand::new(raw_path, output)
            .video_filter(chain.render())
            .video_codec(DEFAULT_VIDEO_CODEC)
            .preset(DEFAULT_PRESET)
            .crf(DEFAULT_CRF)
            .pixel_format(DEFAULT_PIXEL_FORMAT)
            .audio_codec("copy")
    }

    /// Process `raw_path` in place and return it.
    ///
    /// The encode goes to a scratch file that is renamed over `raw_path`
    /// only once it is complete. On any failure the original file is left
    /// as it was and the scratch file is removed.
    pub async fn process(
        &self,
        raw_path: &Path,
        settings: &FilterSettings,
        observer: Option<&dyn StageObserver>,
    ) -> MediaResult<PathBuf> {
        match self.process_inner(raw_path, settings).await {
            Ok(path) => {
                notify_info(
                    observer,
                    Stage::Process,
                    &format!("Processed video {}", path.display()),
                );
                Ok(path)
            }
            Err(e) => {
                notify_error(
                    observer,
                    Stage::Process,
                    &format!("Error processing video {}: {}", raw_path.display(), e),
                );
                Err(e)
            }
        }
    }

    async fn process_inner(&self, raw_path: &Path, settings: &FilterSettings) -> MediaResult<PathBuf> {
        if !raw_path.exists() {
            return Err(MediaError::FileNotFound(raw_path.to_path_buf()));
        }

        let chain = FilterChain::from_settings(settings)?;
        let tmp_path = temp_sibling(raw_path);
        let cmd = Self::build_command(raw_path, &tmp_path, &chain);

        debug!(
            input = %raw_path.display(),
            filters = %chain.render(),
            "Applying filter chain"
        );

        if let Err(e) = self.toolchain.run(&cmd).await {
            remove_quietly(&tmp_path).await;
            return Err(e);
        }

        if let Err(e) = replace_file(&tmp_path, raw_path).await {
            remove_quietly(&tmp_path).await;
            return Err(e);
        }

        info!(path = %raw_path.display(), "Video processed");
        Ok(raw_path.to_path_buf())
    }
}
