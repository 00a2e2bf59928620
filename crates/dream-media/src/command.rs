//! FFmpeg invocation: argument building and the subprocess runner.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// One FFmpeg call: a single input, a single output and the output options
/// between them, kept as flag/value pairs in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    options: Vec<(String, String)>,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            options: Vec::new(),
        }
    }

    /// Append an output option such as `-crf 18`.
    pub fn option(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((flag.into(), value.into()));
        self
    }

    /// `-vf <graph>`
    pub fn video_filter(self, graph: impl Into<String>) -> Self {
        self.option("-vf", graph)
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.option("-c:v", codec)
    }

    /// `copy` passes the audio track through untouched.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.option("-c:a", codec)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.option("-crf", crf.to_string())
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.option("-preset", preset)
    }

    pub fn pixel_format(self, format: impl Into<String>) -> Self {
        self.option("-pix_fmt", format)
    }

    /// Stop after one decoded frame.
    pub fn single_frame(self) -> Self {
        self.option("-frames:v", "1")
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Value given for `flag`, if the option was set.
    pub fn output_value(&self, flag: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(f, _)| f == flag)
            .map(|(_, value)| value.as_str())
    }

    /// Full argument list: `-y -hide_banner -v error -i <input> <options> <output>`.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-y", "-hide_banner", "-v", "error", "-i"]
            .into_iter()
            .map(String::from)
            .collect();
        args.push(self.input.to_string_lossy().into_owned());
        for (flag, value) in &self.options {
            args.push(flag.clone());
            args.push(value.clone());
        }
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Spawns `ffmpeg` once per command.
///
/// Holds no per-run state, so one runner serves concurrent pipelines.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill runs that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run `cmd` to completion. A non-zero exit carries FFmpeg's stderr.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!(args = %args.join(" "), "Spawning ffmpeg");

        let output = self.wait(&args).await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(MediaError::ffmpeg_failed(
            format!("ffmpeg exited with {}", output.status),
            (!stderr.is_empty()).then_some(stderr),
            output.status.code(),
        ))
    }

    async fn wait(&self, args: &[String]) -> MediaResult<Output> {
        let child = Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let Some(limit) = self.timeout else {
            return Ok(child.await?);
        };

        match tokio::time::timeout(limit, child).await {
            Ok(output) => Ok(output?),
            Err(_) => {
                // kill_on_drop reaps the child
                warn!(timeout_secs = limit.as_secs(), "ffmpeg exceeded its time limit");
                Err(MediaError::Timeout(limit.as_secs()))
            }
        }
    }
}

/// Locate `ffmpeg` on PATH.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Locate `ffprobe` on PATH.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_args() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .video_filter("eq=brightness=0.1")
            .video_codec("libx264")
            .crf(18);

        let args = cmd.build_args();
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("output.mp4"));
        assert_eq!(cmd.output_value("-c:v"), Some("libx264"));
        assert_eq!(cmd.output_value("-crf"), Some("18"));
        assert_eq!(cmd.output_value("-vf"), Some("eq=brightness=0.1"));
        assert_eq!(cmd.output_value("-preset"), None);
    }

    #[test]
    fn test_options_follow_input() {
        let args = FfmpegCommand::new("in.mp4", "out.png")
            .single_frame()
            .build_args();

        let input_idx = args.iter().position(|a| a == "-i").unwrap();
        let frames_idx = args.iter().position(|a| a == "-frames:v").unwrap();
        assert!(input_idx < frames_idx);
        assert_eq!(args[input_idx + 1], "in.mp4");
        assert_eq!(args[frames_idx + 1], "1");
    }
}
