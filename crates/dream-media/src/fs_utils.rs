//! Filesystem helpers for write-then-rename replacement.
//!
//! A reader of the destination path sees either the old file or the new
//! one, never a partially written file.

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::error::MediaResult;

/// Unique scratch path next to `path`, keeping its extension.
///
/// Staying in the same directory keeps the final rename on one filesystem;
/// keeping the extension lets FFmpeg pick the right muxer.
pub fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "media".to_string());
    let name = match path.extension() {
        Some(ext) => format!(".{}.{}.tmp.{}", stem, Uuid::new_v4().simple(), ext.to_string_lossy()),
        None => format!(".{}.{}.tmp", stem, Uuid::new_v4().simple()),
    };
    path.with_file_name(name)
}

/// Atomically replace `dst` with `src`.
///
/// `src` must be on the same filesystem as `dst`; callers pass a
/// [`temp_sibling`] of the destination.
pub async fn replace_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    fs::rename(src.as_ref(), dst.as_ref()).await?;
    Ok(())
}

/// Remove a scratch file, logging instead of failing.
pub async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove temp file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_sibling_keeps_dir_and_extension() {
        let path = Path::new("/videos/file.mp4");
        let a = temp_sibling(path);
        let b = temp_sibling(path);

        assert_eq!(a.parent(), path.parent());
        assert_eq!(a.extension().unwrap(), "mp4");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_replace_file_overwrites_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("source.mp4");
        let dst = dir.path().join("dest.mp4");

        fs::write(&src, b"new content").await.unwrap();
        fs::write(&dst, b"old content").await.unwrap();

        replace_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "new content");
    }

    #[tokio::test]
    async fn test_replace_missing_source_keeps_destination() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("dest.mp4");
        fs::write(&dst, b"old content").await.unwrap();

        let result = replace_file(dir.path().join("missing.mp4"), &dst).await;

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "old content");
    }
}
