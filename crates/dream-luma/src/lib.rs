//! Client for the Luma Dream Machine generation API.
//!
//! Covers the three calls the pipeline makes: submitting a generation
//! (optionally continuing an earlier one), reading its status, and checking
//! that the API key is accepted.

pub mod client;
pub mod error;
pub mod types;

pub use client::{GenerationProvider, LumaClient, LumaClientConfig};
pub use error::{LumaError, LumaResult};
pub use types::{GenerationRequest, GenerationSettings, GenerationStatus};
