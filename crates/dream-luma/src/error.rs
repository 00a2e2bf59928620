//! Luma client error types.

use thiserror::Error;

pub type LumaResult<T> = Result<T, LumaError>;

#[derive(Debug, Error)]
pub enum LumaError {
    #[error("Luma API error: {status} - {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Luma response did not contain a generation id")]
    MissingId,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LumaError {
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }

    /// HTTP status attached to the error, if the provider answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            LumaError::RequestFailed { status, .. } => Some(*status),
            LumaError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether repeating the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LumaError::Network(_) => true,
            LumaError::RequestFailed { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
