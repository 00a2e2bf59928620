//! Structured job logging.
//!
//! `JobLogger` is the stock [`StageObserver`]: it turns stage events into
//! `tracing` events tagged with the operation and stage.

use dream_models::{Stage, StageObserver};
use tracing::{error, info, Span};

/// Observer that forwards stage events to `tracing`.
#[derive(Debug, Clone)]
pub struct JobLogger {
    operation: String,
}

impl Default for JobLogger {
    fn default() -> Self {
        Self::new("generate_video")
    }
}

impl JobLogger {
    /// Create a logger for an operation (e.g. "generate_video").
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
        }
    }

    /// Get the operation type.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for one request.
    ///
    /// Events logged inside the span carry the request's file name, which
    /// is how concurrent runs are told apart.
    pub fn create_span(&self, filename: &str, extend: bool) -> Span {
        tracing::info_span!(
            "generation",
            operation = %self.operation,
            filename = %filename,
            extend = extend
        )
    }
}

impl StageObserver for JobLogger {
    fn info(&self, stage: Stage, message: &str) {
        info!(
            operation = %self.operation,
            stage = %stage,
            "{}", message
        );
    }

    fn error(&self, stage: Stage, message: &str) {
        error!(
            operation = %self.operation,
            stage = %stage,
            "{}", message
        );
    }
}
