//! Prompt splitting for chained (extended) generations.

use serde::{Deserialize, Serialize};

/// Marker separating the base prompt from the extension prompt.
pub const EXTENSION_DELIMITER: &str = "*****";

/// How a caller's prompt maps onto provider jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPlan {
    /// One generation from the whole prompt.
    Single(String),
    /// A base generation followed by an extension continuing it.
    Chained { base: String, extension: String },
}

impl PromptPlan {
    /// Build the plan for `prompt`.
    ///
    /// Chaining needs `extend` and the delimiter with text on both sides.
    /// Without `extend` the prompt is sent exactly as given. With `extend`
    /// but an empty side, the delimiter is dropped and the rest is sent as
    /// one generation.
    pub fn new(prompt: &str, extend: bool) -> Self {
        match prompt.split_once(EXTENSION_DELIMITER) {
            Some((base, extension)) if extend => {
                let base = base.trim();
                let extension = extension.trim();
                if !base.is_empty() && !extension.is_empty() {
                    return PromptPlan::Chained {
                        base: base.to_string(),
                        extension: extension.to_string(),
                    };
                }
                PromptPlan::Single(strip_delimiter(prompt))
            }
            _ => PromptPlan::Single(prompt.to_string()),
        }
    }

    pub fn is_chained(&self) -> bool {
        matches!(self, PromptPlan::Chained { .. })
    }

    /// Prompt for the first job submitted.
    pub fn base_prompt(&self) -> &str {
        match self {
            PromptPlan::Single(prompt) => prompt,
            PromptPlan::Chained { base, .. } => base,
        }
    }
}

fn strip_delimiter(prompt: &str) -> String {
    prompt
        .split(EXTENSION_DELIMITER)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Request to continue a completed job with a new prompt segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRequest {
    /// Completed job the extension continues from
    pub parent_job_id: String,
    /// Prompt segment after the delimiter
    pub extension_prompt: String,
}

impl ExtensionRequest {
    pub fn new(parent_job_id: impl Into<String>, extension_prompt: impl Into<String>) -> Self {
        Self {
            parent_job_id: parent_job_id.into(),
            extension_prompt: extension_prompt.into(),
        }
    }
}
