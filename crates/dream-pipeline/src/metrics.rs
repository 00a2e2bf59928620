//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SUBMISSIONS_TOTAL: &str = "dream_submissions_total";
    pub const POLLS_TOTAL: &str = "dream_status_polls_total";
    pub const GENERATIONS_STARTED_TOTAL: &str = "dream_generations_started_total";
    pub const GENERATIONS_COMPLETED_TOTAL: &str = "dream_generations_completed_total";
    pub const GENERATIONS_FAILED_TOTAL: &str = "dream_generations_failed_total";
    pub const STAGE_DURATION_SECONDS: &str = "dream_stage_duration_seconds";
    pub const GENERATION_DURATION_SECONDS: &str = "dream_generation_duration_seconds";
}

/// Record a submission ("base" or "extension").
pub fn record_submission(kind: &'static str) {
    counter!(names::SUBMISSIONS_TOTAL, "kind" => kind).increment(1);
}

/// Record one status query.
pub fn record_poll() {
    counter!(names::POLLS_TOTAL).increment(1);
}

pub fn record_generation_started(extend: bool) {
    counter!(names::GENERATIONS_STARTED_TOTAL, "extend" => extend.to_string()).increment(1);
}

pub fn record_generation_completed(duration_secs: f64) {
    counter!(names::GENERATIONS_COMPLETED_TOTAL).increment(1);
    histogram!(names::GENERATION_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed generation, labelled by stage and error kind.
pub fn record_generation_failed(stage: &'static str, kind: &'static str) {
    counter!(names::GENERATIONS_FAILED_TOTAL, "stage" => stage, "kind" => kind).increment(1);
}

pub fn record_stage_duration(stage: &'static str, duration_secs: f64) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage).record(duration_secs);
}
