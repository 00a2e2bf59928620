//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use dream_luma::{GenerationSettings, LumaClientConfig};
use dream_models::polling::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use dream_models::processing::{
    DEFAULT_BILATERAL_SIGMA, DEFAULT_BRIGHTNESS, DEFAULT_DENOISE_THRESHOLD, DEFAULT_NOISE_STRENGTH,
    DEFAULT_THUMBS_DIR, DEFAULT_VIBRANCE, DEFAULT_VIDEOS_DIR,
};
use dream_models::{FilterSettings, PollingPolicy, ProcessingConfig};

use crate::error::{PipelineError, PipelineResult};

/// Everything a pipeline run reads, passed explicitly to each stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Provider endpoints and credentials
    pub luma: LumaClientConfig,
    /// Model parameters sent with every generation
    pub generation: GenerationSettings,
    /// Status queries before giving up
    pub max_poll_attempts: u32,
    /// Pause between status queries
    pub poll_interval: Duration,
    /// Filter parameters and output directories
    pub processing: ProcessingConfig,
    /// Chain generations when the prompt contains the delimiter
    pub extend: bool,
    /// Kill FFmpeg runs that take longer than this
    pub ffmpeg_timeout: Option<Duration>,
    /// Whole-request limit for fetching the generated asset
    pub download_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            luma: LumaClientConfig::default(),
            generation: GenerationSettings::default(),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            processing: ProcessingConfig::default(),
            extend: false,
            ffmpeg_timeout: Some(Duration::from_secs(600)),
            download_timeout: Duration::from_secs(300),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = GenerationSettings::default();

        Self {
            luma: LumaClientConfig::from_env(),
            generation: GenerationSettings {
                model: std::env::var("LUMA_MODEL").unwrap_or(defaults.model),
                resolution: std::env::var("LUMA_RESOLUTION").unwrap_or(defaults.resolution),
                duration: std::env::var("LUMA_DURATION").unwrap_or(defaults.duration),
                aspect_ratio: std::env::var("LUMA_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio),
            },
            max_poll_attempts: env_parse("LUMA_MAX_POLL_ATTEMPTS")
                .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS),
            poll_interval: env_parse::<f64>("LUMA_POLL_INTERVAL")
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            processing: ProcessingConfig {
                filters: FilterSettings {
                    brightness: env_parse("FFMPEG_BRIGHTNESS").unwrap_or(DEFAULT_BRIGHTNESS),
                    vibrance: env_parse("FFMPEG_VIBRANCE").unwrap_or(DEFAULT_VIBRANCE),
                    denoise_threshold: env_parse("FFMPEG_DENOISE_THRESHOLD")
                        .unwrap_or(DEFAULT_DENOISE_THRESHOLD),
                    bilateral_sigma: env_parse("FFMPEG_BILATERAL_SIGMA")
                        .unwrap_or(DEFAULT_BILATERAL_SIGMA),
                    noise_strength: env_parse("FFMPEG_NOISE_STRENGTH")
                        .unwrap_or(DEFAULT_NOISE_STRENGTH),
                },
                videos_dir: PathBuf::from(
                    std::env::var("VIDEOS_DIR").unwrap_or_else(|_| DEFAULT_VIDEOS_DIR.to_string()),
                ),
                thumbs_dir: PathBuf::from(
                    std::env::var("THUMBS_DIR").unwrap_or_else(|_| DEFAULT_THUMBS_DIR.to_string()),
                ),
            },
            extend: std::env::var("LUMA_EXTEND")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            ffmpeg_timeout: Some(Duration::from_secs(
                env_parse("FFMPEG_TIMEOUT_SECS").unwrap_or(600),
            )),
            download_timeout: Duration::from_secs(
                env_parse("DOWNLOAD_TIMEOUT_SECS").unwrap_or(300),
            ),
        }
    }

    /// Polling policy built from the configured attempts and interval.
    pub fn polling_policy(&self) -> PipelineResult<PollingPolicy> {
        Ok(PollingPolicy::new(self.max_poll_attempts, self.poll_interval)?)
    }

    /// Reject configurations that cannot produce a video.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.luma.api_key.trim().is_empty() {
            return Err(PipelineError::config("LUMALABS_API_KEY is not set"));
        }
        if self.luma.generations_endpoint.trim().is_empty() {
            return Err(PipelineError::config("generations endpoint is empty"));
        }
        self.polling_policy()?;
        self.processing
            .filters
            .validate()
            .map_err(|e| PipelineError::config(e.to_string()))?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// `1`, `true` and `yes` (any case) enable a flag.
fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.luma.api_key = "key".to_string();
        config
    }

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_poll_attempts, 60);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert!(!config.extend);
        assert_eq!(config.processing.videos_dir, PathBuf::from("media/video"));
    }

    #[test]
    fn test_validate() {
        assert!(valid_config().validate().is_ok());

        let missing_key = PipelineConfig::default();
        assert!(matches!(
            missing_key.validate(),
            Err(PipelineError::Config(_))
        ));

        let mut zero_attempts = valid_config();
        zero_attempts.max_poll_attempts = 0;
        assert!(matches!(
            zero_attempts.validate(),
            Err(PipelineError::Model(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no"));
    }
}
