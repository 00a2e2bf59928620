//! Pipeline error taxonomy.

use std::path::PathBuf;

use dream_luma::LumaError;
use dream_media::MediaError;
use dream_models::{JobState, ModelError, Stage};
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Submission failed: {0}")]
    Submission(#[source] LumaError),

    #[error("Status query for generation {job_id} failed: {source}")]
    StatusQuery {
        job_id: String,
        #[source]
        source: LumaError,
    },

    #[error("Video generation failed ({state}) for {job_id}: {reason}")]
    GenerationFailed {
        job_id: String,
        state: JobState,
        reason: String,
    },

    #[error("Timed out waiting for video generation {job_id} after {attempts} attempts")]
    Timeout { job_id: String, attempts: u32 },

    #[error("Video URL not found in completed generation {job_id}")]
    AssetMissing { job_id: String },

    #[error("Failed to get extend generation ID for parent {parent_job_id}")]
    ExtensionIdMissing { parent_job_id: String },

    #[error("Download failed: {0}")]
    Download(#[source] MediaError),

    #[error("Processing failed during {stage}: {source}")]
    Processing {
        stage: Stage,
        #[source]
        source: MediaError,
    },

    #[error("No video stream found in {0}")]
    NoVideoStream(PathBuf),

    #[error("Invalid job state: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a media failure raised while post-processing.
    pub fn from_media(stage: Stage, error: MediaError) -> Self {
        match error {
            MediaError::NoVideoStream(path) => PipelineError::NoVideoStream(path),
            source => PipelineError::Processing { stage, source },
        }
    }

    /// Stage that raised the error, when it came from one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Submission(_) => Some(Stage::Submit),
            PipelineError::StatusQuery { .. }
            | PipelineError::GenerationFailed { .. }
            | PipelineError::Timeout { .. }
            | PipelineError::AssetMissing { .. } => Some(Stage::Poll),
            PipelineError::ExtensionIdMissing { .. } => Some(Stage::Extend),
            PipelineError::Download(_) => Some(Stage::Download),
            PipelineError::Processing { stage, .. } => Some(*stage),
            PipelineError::NoVideoStream(_) => Some(Stage::Thumbnail),
            PipelineError::Model(_) | PipelineError::Config(_) => None,
        }
    }

    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Submission(_) => "submission",
            PipelineError::StatusQuery { .. } => "status_query",
            PipelineError::GenerationFailed { .. } => "generation_failed",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::AssetMissing { .. } => "asset_missing",
            PipelineError::ExtensionIdMissing { .. } => "extension_id_missing",
            PipelineError::Download(_) => "download",
            PipelineError::Processing { .. } => "processing",
            PipelineError::NoVideoStream(_) => "no_video_stream",
            PipelineError::Model(_) => "model",
            PipelineError::Config(_) => "config",
        }
    }

    /// Whether running the whole generation again might succeed.
    ///
    /// The pipeline never retries on its own; this is for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Submission(e) => e.is_retryable(),
            PipelineError::StatusQuery { source, .. } => source.is_retryable(),
            PipelineError::Timeout { .. } => true,
            PipelineError::Download(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = PipelineError::Submission(LumaError::request_failed(500, "fail"));
        assert!(err.to_string().contains("Luma API error: 500 - fail"));

        let err = PipelineError::GenerationFailed {
            job_id: "g1".to_string(),
            state: JobState::Failed,
            reason: "bad".to_string(),
        };
        assert!(err.to_string().starts_with("Video generation failed"));

        let err = PipelineError::Timeout {
            job_id: "g1".to_string(),
            attempts: 1,
        };
        assert!(err.to_string().starts_with("Timed out waiting for video generation"));
    }

    #[test]
    fn test_media_classification() {
        let err = PipelineError::from_media(
            Stage::Thumbnail,
            MediaError::NoVideoStream(PathBuf::from("v.mp4")),
        );
        assert!(matches!(err, PipelineError::NoVideoStream(_)));
        assert_eq!(err.stage(), Some(Stage::Thumbnail));

        let err = PipelineError::from_media(
            Stage::Process,
            MediaError::ffmpeg_failed("boom", None, Some(1)),
        );
        assert_eq!(err.stage(), Some(Stage::Process));
        assert_eq!(err.kind(), "processing");
        assert!(!err.is_retryable());
    }
}
