//! Model validation errors.

use thiserror::Error;

use crate::job::JobState;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Job id must not be empty")]
    EmptyJobId,

    #[error("Job {id} is already {state} and cannot change state")]
    TerminalState { id: String, state: JobState },

    #[error("Polling policy requires at least one attempt")]
    ZeroAttempts,

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ModelError {
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
