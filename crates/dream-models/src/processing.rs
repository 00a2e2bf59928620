//! Post-processing configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

pub const DEFAULT_BRIGHTNESS: f64 = 0.0;
pub const DEFAULT_VIBRANCE: f64 = 0.0;
pub const DEFAULT_DENOISE_THRESHOLD: f64 = 4.0;
pub const DEFAULT_BILATERAL_SIGMA: f64 = 0.1;
pub const DEFAULT_NOISE_STRENGTH: f64 = 0.0;

pub const DEFAULT_VIDEOS_DIR: &str = "media/video";
pub const DEFAULT_THUMBS_DIR: &str = "media/thumbs";

/// Parameters for the color/noise correction chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// `eq` brightness offset (-1.0..=1.0)
    #[serde(default = "default_brightness")]
    pub brightness: f64,

    /// `vibrance` intensity (-2.0..=2.0)
    #[serde(default = "default_vibrance")]
    pub vibrance: f64,

    /// `hqdn3d` luma spatial strength
    #[serde(default = "default_denoise_threshold")]
    pub denoise_threshold: f64,

    /// `bilateral` spatial sigma
    #[serde(default = "default_bilateral_sigma")]
    pub bilateral_sigma: f64,

    /// Grain re-inserted by the `noise` filter (0..=100)
    #[serde(default = "default_noise_strength")]
    pub noise_strength: f64,
}

fn default_brightness() -> f64 {
    DEFAULT_BRIGHTNESS
}
fn default_vibrance() -> f64 {
    DEFAULT_VIBRANCE
}
fn default_denoise_threshold() -> f64 {
    DEFAULT_DENOISE_THRESHOLD
}
fn default_bilateral_sigma() -> f64 {
    DEFAULT_BILATERAL_SIGMA
}
fn default_noise_strength() -> f64 {
    DEFAULT_NOISE_STRENGTH
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            vibrance: DEFAULT_VIBRANCE,
            denoise_threshold: DEFAULT_DENOISE_THRESHOLD,
            bilateral_sigma: DEFAULT_BILATERAL_SIGMA,
            noise_strength: DEFAULT_NOISE_STRENGTH,
        }
    }
}

impl FilterSettings {
    /// Reject values FFmpeg would refuse to parse.
    pub fn validate(&self) -> ModelResult<()> {
        let fields = [
            ("brightness", self.brightness),
            ("vibrance", self.vibrance),
            ("denoise_threshold", self.denoise_threshold),
            ("bilateral_sigma", self.bilateral_sigma),
            ("noise_strength", self.noise_strength),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ModelError::invalid_value(field, "must be a finite number"));
            }
        }
        if self.denoise_threshold < 0.0 {
            return Err(ModelError::invalid_value(
                "denoise_threshold",
                "must not be negative",
            ));
        }
        if self.bilateral_sigma <= 0.0 {
            return Err(ModelError::invalid_value(
                "bilateral_sigma",
                "must be positive",
            ));
        }
        if self.noise_strength < 0.0 {
            return Err(ModelError::invalid_value(
                "noise_strength",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Filter parameters plus where finished media lands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    #[serde(default)]
    pub filters: FilterSettings,
    pub videos_dir: PathBuf,
    pub thumbs_dir: PathBuf,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            filters: FilterSettings::default(),
            videos_dir: PathBuf::from(DEFAULT_VIDEOS_DIR),
            thumbs_dir: PathBuf::from(DEFAULT_THUMBS_DIR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(FilterSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite() {
        let settings = FilterSettings {
            brightness: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: FilterSettings = serde_json::from_str(r#"{"brightness": 0.1}"#).unwrap();
        assert_eq!(settings.brightness, 0.1);
        assert_eq!(settings.denoise_threshold, DEFAULT_DENOISE_THRESHOLD);
    }
}
