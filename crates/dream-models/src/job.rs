//! Generation job state.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Lifecycle state of a provider-side generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is queued or rendering on the provider
    #[default]
    Running,
    /// Job finished and (normally) exposes a video asset
    Completed,
    /// Provider reported a failed generation
    Failed,
    /// Provider reported an internal error
    Error,
    /// Local attempt budget ran out while the job was still pending
    Timeout,
}

impl JobState {
    /// Map a provider `state` string onto the local state machine.
    ///
    /// Anything other than `completed`, `failed` or `error` (`queued`,
    /// `dreaming`, ...) is still pending.
    pub fn from_provider(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            "error" => JobState::Error,
            _ => JobState::Running,
        }
    }

    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Error => "error",
            JobState::Timeout => "timeout",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of work submitted to the video provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    id: String,
    state: JobState,
    video_url: Option<String>,
}

impl GenerationJob {
    /// Create a running job from a provider-assigned id.
    pub fn new(id: impl Into<String>) -> ModelResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::EmptyJobId);
        }
        Ok(Self {
            id,
            state: JobState::Running,
            video_url: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    /// Move the job to `state`, recording the asset url if one was resolved.
    ///
    /// Terminal jobs are frozen: the transition is rejected and the job is
    /// left as it was.
    pub fn transition(&mut self, state: JobState, video_url: Option<String>) -> ModelResult<()> {
        if self.state.is_terminal() {
            return Err(ModelError::TerminalState {
                id: self.id.clone(),
                state: self.state,
            });
        }
        self.state = state;
        if video_url.is_some() {
            self.video_url = video_url;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider() {
        assert_eq!(JobState::from_provider("completed"), JobState::Completed);
        assert_eq!(JobState::from_provider("FAILED"), JobState::Failed);
        assert_eq!(JobState::from_provider("error"), JobState::Error);
        assert_eq!(JobState::from_provider("dreaming"), JobState::Running);
        assert_eq!(JobState::from_provider("queued"), JobState::Running);
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(GenerationJob::new("  ").is_err());
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut job = GenerationJob::new("g1").unwrap();
        job.transition(JobState::Running, None).unwrap();
        job.transition(JobState::Completed, Some("http://x/v.mp4".into()))
            .unwrap();

        let err = job.transition(JobState::Failed, None).unwrap_err();
        assert!(matches!(err, ModelError::TerminalState { .. }));
        assert_eq!(job.state(), JobState::Completed);
        assert_eq!(job.video_url(), Some("http://x/v.mp4"));
    }
}
