//! In-memory provider and sleeper for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dream_luma::types::Assets;
use dream_luma::{GenerationProvider, GenerationRequest, GenerationStatus, LumaError, LumaResult};

use crate::poller::Sleeper;

/// Canned answer to a submission.
#[derive(Debug, Clone)]
pub enum Submitted {
    Id(String),
    MissingId,
    Rejected(u16),
}

/// Provider that replays scripted answers and records every call.
///
/// Status scripts are per id; the last entry repeats once the rest is used.
#[derive(Default)]
pub struct ScriptedProvider {
    submissions: Mutex<VecDeque<Submitted>>,
    statuses: Mutex<HashMap<String, VecDeque<GenerationStatus>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    status_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submission(self, answer: Submitted) -> Self {
        self.submissions.lock().unwrap().push_back(answer);
        self
    }

    pub fn with_statuses(self, id: &str, statuses: Vec<GenerationStatus>) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .insert(id.to_string(), statuses.into());
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn submit(&self, request: &GenerationRequest) -> LumaResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        match self.submissions.lock().unwrap().pop_front() {
            Some(Submitted::Id(id)) => Ok(id),
            Some(Submitted::MissingId) => Err(LumaError::MissingId),
            Some(Submitted::Rejected(status)) => Err(LumaError::request_failed(status, "rejected")),
            None => Err(LumaError::request_failed(500, "no scripted submission")),
        }
    }

    async fn status(&self, id: &str) -> LumaResult<GenerationStatus> {
        self.status_calls.lock().unwrap().push(id.to_string());
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses
            .get_mut(id)
            .ok_or_else(|| LumaError::request_failed(404, "not found"))?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.ok_or_else(|| LumaError::request_failed(404, "not found"))
    }
}

/// Sleeper that returns at once and remembers what it was asked to wait.
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub fn pending() -> GenerationStatus {
    GenerationStatus {
        state: "dreaming".to_string(),
        ..Default::default()
    }
}

pub fn completed(video_url: &str) -> GenerationStatus {
    GenerationStatus {
        state: "completed".to_string(),
        assets: Some(Assets {
            video: Some(video_url.to_string()),
        }),
        ..Default::default()
    }
}

pub fn failed(reason: &str) -> GenerationStatus {
    GenerationStatus {
        state: "failed".to_string(),
        failure_reason: Some(reason.to_string()),
        ..Default::default()
    }
}
