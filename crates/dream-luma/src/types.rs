//! Luma API request/response types.

use dream_models::{ExtensionRequest, JobState};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "ray-2";
pub const DEFAULT_RESOLUTION: &str = "540p";
pub const DEFAULT_DURATION: &str = "5s";
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Model parameters shared by every generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub model: String,
    pub resolution: String,
    pub duration: String,
    pub aspect_ratio: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
            duration: DEFAULT_DURATION.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }
}

/// Body of `POST /generations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub resolution: String,
    pub duration: String,
    pub aspect_ratio: String,
    /// Set only when continuing an earlier generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Keyframes>,
}

impl GenerationRequest {
    /// Fresh generation from a prompt.
    pub fn new(prompt: impl Into<String>, settings: &GenerationSettings) -> Self {
        Self {
            prompt: prompt.into(),
            model: settings.model.clone(),
            resolution: settings.resolution.clone(),
            duration: settings.duration.clone(),
            aspect_ratio: settings.aspect_ratio.clone(),
            keyframes: None,
        }
    }

    /// Generation that continues from the end of a completed job.
    pub fn extension(request: &ExtensionRequest, settings: &GenerationSettings) -> Self {
        Self {
            keyframes: Some(Keyframes {
                frame0: KeyframeRef::generation(&request.parent_job_id),
            }),
            ..Self::new(request.extension_prompt.clone(), settings)
        }
    }

    /// Parent job referenced by this request, if it is an extension.
    pub fn parent_id(&self) -> Option<&str> {
        self.keyframes.as_ref().map(|k| k.frame0.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframes {
    pub frame0: KeyframeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl KeyframeRef {
    pub fn generation(id: impl Into<String>) -> Self {
        Self {
            kind: "generation".to_string(),
            id: id.into(),
        }
    }
}

/// Body returned by a successful submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    pub id: Option<String>,
}

impl SubmitResponse {
    /// Non-empty generation id.
    pub fn generation_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Body of `GET /generations/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub assets: Option<Assets>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub video: Option<String>,
}

impl GenerationStatus {
    pub fn job_state(&self) -> JobState {
        JobState::from_provider(&self.state)
    }

    /// Resolved video url, ignoring empty strings.
    pub fn video_url(&self) -> Option<&str> {
        self.assets
            .as_ref()
            .and_then(|a| a.video.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    /// Provider explanation for a failed job.
    pub fn reason(&self) -> &str {
        self.failure_reason
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or("unknown")
    }
}
