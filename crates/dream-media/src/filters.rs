//! Color and noise correction filter chain.
//!
//! The chain always runs the same stages in the same order; only the
//! parameters come from configuration.

use dream_models::FilterSettings;

use crate::error::{MediaError, MediaResult};

/// One named stage of the correction chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    /// `eq` brightness offset
    Brightness(f64),
    /// Saturation boost weighted towards muted colors
    Vibrance(f64),
    /// High-quality 3D denoise, luma spatial strength
    Denoise(f64),
    /// Edge-preserving smoothing
    Bilateral(f64),
    /// Temporal + uniform grain re-inserted after smoothing
    Grain(f64),
}

impl FilterStage {
    /// Stage name, stable across parameter values.
    pub fn name(&self) -> &'static str {
        match self {
            FilterStage::Brightness(_) => "brightness",
            FilterStage::Vibrance(_) => "vibrance",
            FilterStage::Denoise(_) => "denoise",
            FilterStage::Bilateral(_) => "bilateral",
            FilterStage::Grain(_) => "grain",
        }
    }

    /// FFmpeg filter expression for this stage.
    pub fn to_filter(&self) -> String {
        match self {
            FilterStage::Brightness(value) => format!("eq=brightness={}", value),
            FilterStage::Vibrance(value) => format!("vibrance=intensity={}", value),
            FilterStage::Denoise(value) => format!("hqdn3d={}", value),
            FilterStage::Bilateral(value) => format!("bilateral=sigmaS={}", value),
            // `alls` only takes integers
            FilterStage::Grain(value) => format!("noise=alls={}:allf=t+u", value.round() as i64),
        }
    }
}

/// Ordered correction chain applied to every downloaded video.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Build the chain from settings, rejecting values FFmpeg cannot take.
    pub fn from_settings(settings: &FilterSettings) -> MediaResult<Self> {
        settings
            .validate()
            .map_err(|e| MediaError::InvalidFilter(e.to_string()))?;

        Ok(Self {
            stages: vec![
                FilterStage::Brightness(settings.brightness),
                FilterStage::Vibrance(settings.vibrance),
                FilterStage::Denoise(settings.denoise_threshold),
                FilterStage::Bilateral(settings.bilateral_sigma),
                FilterStage::Grain(settings.noise_strength),
            ],
        })
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Stage names in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(FilterStage::name).collect()
    }

    /// Render as a single `-vf` argument.
    pub fn render(&self) -> String {
        self.stages
            .iter()
            .map(FilterStage::to_filter)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Scale filter for a fixed output size.
pub fn filter_scale(width: u32, height: u32) -> String {
    format!("scale={}:{}", width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_fixed() {
        let chain = FilterChain::from_settings(&FilterSettings::default()).unwrap();
        assert_eq!(
            chain.names(),
            vec!["brightness", "vibrance", "denoise", "bilateral", "grain"]
        );
    }

    #[test]
    fn test_render_uses_settings() {
        let settings = FilterSettings {
            brightness: 0.1,
            vibrance: 0.2,
            denoise_threshold: 0.3,
            bilateral_sigma: 0.4,
            noise_strength: 6.0,
        };
        let chain = FilterChain::from_settings(&settings).unwrap();
        assert_eq!(
            chain.render(),
            "eq=brightness=0.1,vibrance=intensity=0.2,hqdn3d=0.3,bilateral=sigmaS=0.4,noise=alls=6:allf=t+u"
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = FilterSettings {
            bilateral_sigma: 0.0,
            ..Default::default()
        };
        let err = FilterChain::from_settings(&settings).unwrap_err();
        assert!(matches!(err, MediaError::InvalidFilter(_)));
    }
}
