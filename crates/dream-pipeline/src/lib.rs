//! Prompt-to-video pipeline.
//!
//! Turns a text prompt into a post-processed local video and a thumbnail:
//! - Submits the prompt to the generation provider and polls until done
//! - Optionally continues the clip with a second prompt segment
//! - Downloads the asset, applies the FFmpeg filter chain in place
//! - Extracts a thumbnail from the first frame
//!
//! Each run is sequential and independent; concurrency is the caller's.

pub mod chainer;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod submit;

#[cfg(test)]
mod test_support;

pub use chainer::PromptChainer;
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::JobLogger;
pub use orchestrator::{GeneratedMedia, Pipeline};
pub use poller::{CompletionPoller, Sleeper, TokioSleeper};
pub use submit::JobSubmitter;
