//! FFmpeg CLI wrapper and media download for the dream video pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a subprocess runner
//! - FFprobe stream inspection
//! - The fixed color/noise correction filter chain
//! - In-place video processing with write-then-rename replacement
//! - Thumbnail extraction
//! - Streaming asset download

pub mod command;
pub mod download;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod process;
pub mod thumbnail;
pub mod toolchain;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use download::MediaDownloader;
pub use error::{MediaError, MediaResult};
pub use filters::{FilterChain, FilterStage};
pub use probe::{probe_streams, FrameSize, ProbeReport, StreamInfo};
pub use process::VideoProcessor;
pub use thumbnail::{thumbnail_filename, ThumbnailExtractor};
pub use toolchain::{FfmpegToolchain, MediaToolchain};
