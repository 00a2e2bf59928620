//! Bounded, fixed-interval completion polling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dream_luma::GenerationProvider;
use dream_models::{
    notify_error, notify_info, GenerationJob, JobState, PollingPolicy, Stage, StageObserver,
};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::metrics;

/// Waits between status queries.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Queries a job until it reaches a terminal state or the attempt budget
/// runs out.
#[derive(Clone)]
pub struct CompletionPoller {
    provider: Arc<dyn GenerationProvider>,
    sleeper: Arc<dyn Sleeper>,
}

impl CompletionPoller {
    pub fn new(provider: Arc<dyn GenerationProvider>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { provider, sleeper }
    }

    /// Poll `job_id` and return its video url.
    pub async fn poll(
        &self,
        job_id: &str,
        policy: &PollingPolicy,
        observer: Option<&dyn StageObserver>,
    ) -> PipelineResult<String> {
        let mut job = GenerationJob::new(job_id)?;
        self.poll_job(&mut job, policy, observer).await
    }

    /// Drive `job` to a terminal state.
    ///
    /// Issues at most `policy.max_attempts()` status queries and sleeps
    /// `policy.interval()` after every pending answer. `failed`/`error`
    /// end the loop at once.
    pub async fn poll_job(
        &self,
        job: &mut GenerationJob,
        policy: &PollingPolicy,
        observer: Option<&dyn StageObserver>,
    ) -> PipelineResult<String> {
        if job.state().is_terminal() {
            return settled_outcome(job);
        }

        for attempt in 1..=policy.max_attempts() {
            metrics::record_poll();
            let status = match self.provider.status(job.id()).await {
                Ok(status) => status,
                Err(source) => {
                    let err = PipelineError::StatusQuery {
                        job_id: job.id().to_string(),
                        source,
                    };
                    notify_error(observer, Stage::Poll, &err.to_string());
                    return Err(err);
                }
            };

            match status.job_state() {
                JobState::Completed => {
                    let url = status.video_url().map(str::to_string);
                    job.transition(JobState::Completed, url.clone())?;
                    return match url {
                        Some(url) => {
                            notify_info(
                                observer,
                                Stage::Poll,
                                &format!("Generation {} completed after {} attempt(s)", job.id(), attempt),
                            );
                            Ok(url)
                        }
                        None => {
                            let err = PipelineError::AssetMissing {
                                job_id: job.id().to_string(),
                            };
                            notify_error(observer, Stage::Poll, &err.to_string());
                            Err(err)
                        }
                    };
                }
                state @ (JobState::Failed | JobState::Error) => {
                    job.transition(state, None)?;
                    let err = PipelineError::GenerationFailed {
                        job_id: job.id().to_string(),
                        state,
                        reason: status.reason().to_string(),
                    };
                    notify_error(observer, Stage::Poll, &err.to_string());
                    return Err(err);
                }
                JobState::Running | JobState::Timeout => {
                    debug!(
                        job_id = %job.id(),
                        attempt = attempt,
                        max_attempts = policy.max_attempts(),
                        provider_state = %status.state,
                        "Generation still pending"
                    );
                    self.sleeper.sleep(policy.interval()).await;
                }
            }
        }

        job.transition(JobState::Timeout, None)?;
        let err = PipelineError::Timeout {
            job_id: job.id().to_string(),
            attempts: policy.max_attempts(),
        };
        notify_error(observer, Stage::Poll, &err.to_string());
        Err(err)
    }
}

/// Outcome of a job that was already terminal, without querying again.
fn settled_outcome(job: &GenerationJob) -> PipelineResult<String> {
    let job_id = job.id().to_string();
    match job.state() {
        JobState::Completed => job
            .video_url()
            .map(str::to_string)
            .ok_or(PipelineError::AssetMissing { job_id }),
        JobState::Timeout => Err(PipelineError::Timeout {
            job_id,
            attempts: 0,
        }),
        state => Err(PipelineError::GenerationFailed {
            job_id,
            state,
            reason: "job already finished".to_string(),
        }),
    }
}
