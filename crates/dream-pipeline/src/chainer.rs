//! Continuing a completed generation with a second prompt.

use dream_models::{
    ExtensionRequest, GenerationJob, JobState, ModelError, PollingPolicy, StageObserver,
};
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::poller::CompletionPoller;
use crate::submit::JobSubmitter;

/// Submits an extension of a completed job and waits for it.
#[derive(Clone)]
pub struct PromptChainer {
    submitter: JobSubmitter,
    poller: CompletionPoller,
}

impl PromptChainer {
    pub fn new(submitter: JobSubmitter, poller: CompletionPoller) -> Self {
        Self { submitter, poller }
    }

    /// Extend `parent` with `extension_prompt`.
    ///
    /// Returns the extension job and its video url. The parent must have
    /// completed; its own asset is not used afterwards.
    pub async fn extend(
        &self,
        parent: &GenerationJob,
        extension_prompt: &str,
        policy: &PollingPolicy,
        observer: Option<&dyn StageObserver>,
    ) -> PipelineResult<(GenerationJob, String)> {
        if parent.state() != JobState::Completed {
            return Err(PipelineError::Model(ModelError::invalid_value(
                "parent",
                format!("generation {} is {}, not completed", parent.id(), parent.state()),
            )));
        }

        let request = ExtensionRequest::new(parent.id(), extension_prompt);
        let mut job = self.submitter.submit_extension(&request, observer).await?;
        let url = self.poller.poll_job(&mut job, policy, observer).await?;

        info!(parent = %parent.id(), job_id = %job.id(), "Extension completed");
        Ok((job, url))
    }
}
