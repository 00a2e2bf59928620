//! External media tools behind a trait so stages can run without FFmpeg.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::{probe_streams, ProbeReport};

/// Runs FFmpeg commands and probes files.
#[async_trait]
pub trait MediaToolchain: Send + Sync {
    /// Execute one FFmpeg command to completion.
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()>;

    /// Read stream metadata for `path`.
    async fn probe(&self, path: &Path) -> MediaResult<ProbeReport>;
}

/// The real FFmpeg/FFprobe binaries, one subprocess per call.
#[derive(Debug, Clone, Default)]
pub struct FfmpegToolchain {
    runner: FfmpegRunner,
    timeout: Option<Duration>,
}

impl FfmpegToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill FFmpeg and FFprobe runs that exceed `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(timeout),
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl MediaToolchain for FfmpegToolchain {
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.runner.run(cmd).await
    }

    async fn probe(&self, path: &Path) -> MediaResult<ProbeReport> {
        probe_streams(path, self.timeout).await
    }
}
