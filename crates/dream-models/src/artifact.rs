//! Local media produced by one pipeline run.

use std::path::{Path, PathBuf};

/// Files produced by a single invocation.
///
/// `processed_path` starts out equal to `raw_path`; processing replaces the
/// file in place. Nothing here is cleaned up on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    pub raw_path: PathBuf,
    pub processed_path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
}

impl MediaArtifact {
    /// Artifact for a freshly downloaded file.
    pub fn downloaded(raw_path: impl Into<PathBuf>) -> Self {
        let raw_path = raw_path.into();
        Self {
            processed_path: raw_path.clone(),
            raw_path,
            thumbnail_path: None,
        }
    }

    /// Record the processed output path.
    pub fn with_processed(mut self, processed_path: impl Into<PathBuf>) -> Self {
        self.processed_path = processed_path.into();
        self
    }

    /// Record the thumbnail; the first one recorded wins.
    pub fn with_thumbnail(mut self, thumbnail_path: impl Into<PathBuf>) -> Self {
        if self.thumbnail_path.is_none() {
            self.thumbnail_path = Some(thumbnail_path.into());
        }
        self
    }

    /// File name of the processed video.
    pub fn video_filename(&self) -> Option<&str> {
        file_name(&self.processed_path)
    }

    /// File name of the thumbnail, once extracted.
    pub fn thumbnail_filename(&self) -> Option<&str> {
        self.thumbnail_path.as_deref().and_then(file_name)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}
