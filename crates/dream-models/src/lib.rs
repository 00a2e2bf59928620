//! Shared data models for the dream video pipeline.
//!
//! This crate provides:
//! - Provider job state and its terminal-state rules
//! - Prompt splitting for chained generations
//! - Polling policy and post-processing configuration
//! - The per-run media artifact record
//! - The stage observer interface

pub mod artifact;
pub mod error;
pub mod job;
pub mod observer;
pub mod polling;
pub mod processing;
pub mod prompt;

pub use artifact::MediaArtifact;
pub use error::{ModelError, ModelResult};
pub use job::{GenerationJob, JobState};
pub use observer::{notify_error, notify_info, Stage, StageObserver};
pub use polling::PollingPolicy;
pub use processing::{FilterSettings, ProcessingConfig};
pub use prompt::{ExtensionRequest, PromptPlan, EXTENSION_DELIMITER};
