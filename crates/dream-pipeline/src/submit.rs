//! Generation job submission.

use std::sync::Arc;

use dream_luma::{GenerationProvider, GenerationRequest, GenerationSettings, LumaError};
use dream_models::{notify_error, notify_info, ExtensionRequest, GenerationJob, Stage, StageObserver};
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::metrics;

/// Sends generation requests to the provider. One request per call.
#[derive(Clone)]
pub struct JobSubmitter {
    provider: Arc<dyn GenerationProvider>,
    settings: GenerationSettings,
}

impl JobSubmitter {
    pub fn new(provider: Arc<dyn GenerationProvider>, settings: GenerationSettings) -> Self {
        Self { provider, settings }
    }

    /// Submit a fresh generation for `prompt`.
    pub async fn submit(
        &self,
        prompt: &str,
        observer: Option<&dyn StageObserver>,
    ) -> PipelineResult<GenerationJob> {
        if prompt.trim().is_empty() {
            let err = PipelineError::Submission(LumaError::InvalidRequest(
                "prompt must not be empty".to_string(),
            ));
            notify_error(observer, Stage::Submit, &err.to_string());
            return Err(err);
        }

        let request = GenerationRequest::new(prompt, &self.settings);
        metrics::record_submission("base");

        match self.provider.submit(&request).await {
            Ok(id) => {
                notify_info(observer, Stage::Submit, &format!("Generation submitted with id {}", id));
                info!(job_id = %id, "Generation submitted");
                Ok(GenerationJob::new(id)?)
            }
            Err(e) => {
                let err = PipelineError::Submission(e);
                notify_error(observer, Stage::Submit, &err.to_string());
                Err(err)
            }
        }
    }

    /// Submit a generation continuing `request.parent_job_id`.
    ///
    /// A success response without an id is reported as
    /// [`PipelineError::ExtensionIdMissing`].
    pub async fn submit_extension(
        &self,
        request: &ExtensionRequest,
        observer: Option<&dyn StageObserver>,
    ) -> PipelineResult<GenerationJob> {
        let body = GenerationRequest::extension(request, &self.settings);
        metrics::record_submission("extension");

        match self.provider.submit(&body).await {
            Ok(id) => {
                notify_info(
                    observer,
                    Stage::Extend,
                    &format!(
                        "Extension submitted with id {} (parent {})",
                        id, request.parent_job_id
                    ),
                );
                info!(job_id = %id, parent = %request.parent_job_id, "Extension submitted");
                Ok(GenerationJob::new(id)?)
            }
            Err(LumaError::MissingId) => {
                let err = PipelineError::ExtensionIdMissing {
                    parent_job_id: request.parent_job_id.clone(),
                };
                notify_error(observer, Stage::Extend, &err.to_string());
                Err(err)
            }
            Err(e) => {
                let err = PipelineError::Submission(e);
                notify_error(observer, Stage::Extend, &err.to_string());
                Err(err)
            }
        }
    }
}
