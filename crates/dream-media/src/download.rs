//! Streaming download of generated video assets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dream_models::{notify_error, notify_info, Stage, StageObserver};
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{remove_quietly, replace_file, temp_sibling};

/// Extension used for generated file names.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Streams remote assets to local files.
#[derive(Debug, Clone)]
pub struct MediaDownloader {
    http: Client,
}

impl MediaDownloader {
    /// Create a downloader with its own HTTP client.
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Download `url` into `destination_dir` under a fresh unique name.
    pub async fn download(
        &self,
        url: &str,
        destination_dir: &Path,
        observer: Option<&dyn StageObserver>,
    ) -> MediaResult<PathBuf> {
        let filename = format!("{}.{}", Uuid::new_v4(), DEFAULT_VIDEO_EXTENSION);
        self.download_as(url, destination_dir, &filename, observer)
            .await
    }

    /// Download `url` to `destination_dir/filename`.
    ///
    /// The body is streamed into a scratch file and renamed into place once
    /// complete, so the destination never holds a truncated download.
    pub async fn download_as(
        &self,
        url: &str,
        destination_dir: &Path,
        filename: &str,
        observer: Option<&dyn StageObserver>,
    ) -> MediaResult<PathBuf> {
        let destination = destination_dir.join(filename);
        match self.fetch(url, destination_dir, &destination).await {
            Ok(bytes) => {
                notify_info(
                    observer,
                    Stage::Download,
                    &format!("Video saved to {} ({} bytes)", destination.display(), bytes),
                );
                Ok(destination)
            }
            Err(e) => {
                notify_error(
                    observer,
                    Stage::Download,
                    &format!("Error downloading video from {}: {}", url, e),
                );
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: &str, destination_dir: &Path, destination: &Path) -> MediaResult<u64> {
        tokio::fs::create_dir_all(destination_dir).await?;

        debug!(url = url, "Downloading video asset");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(
                format!("asset server returned {}", status),
                Some(status.as_u16()),
            ));
        }

        let tmp_path = temp_sibling(destination);
        match stream_to_file(response, &tmp_path).await {
            Ok(bytes) => {
                if let Err(e) = replace_file(&tmp_path, destination).await {
                    remove_quietly(&tmp_path).await;
                    return Err(e);
                }
                info!(
                    path = %destination.display(),
                    bytes = bytes,
                    "Downloaded video asset"
                );
                Ok(bytes)
            }
            Err(e) => {
                remove_quietly(&tmp_path).await;
                Err(e)
            }
        }
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> MediaResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn downloader() -> MediaDownloader {
        MediaDownloader::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_download_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64 * 1024]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let videos = dir.path().join("videos");
        let url = format!("{}/v.mp4", server.uri());

        let path = downloader()
            .download_as(&url, &videos, "file.mp4", None)
            .await
            .unwrap();

        assert_eq!(path, videos.join("file.mp4"));
        assert_eq!(std::fs::read(&path).unwrap().len(), 64 * 1024);
        assert_eq!(std::fs::read_dir(&videos).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_download_generates_unique_names() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/v.mp4", server.uri());
        let d = downloader();

        let a = d.download(&url, dir.path(), None).await.unwrap();
        let b = d.download(&url, dir.path(), None).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a.extension().unwrap(), "mp4");
    }

    #[tokio::test]
    async fn test_error_status_aborts_without_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let url = format!("{}/v.mp4", server.uri());

        let err = downloader()
            .download_as(&url, dir.path(), "file.mp4", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MediaError::DownloadFailed {
                status: Some(404),
                ..
            }
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let dir = TempDir::new().unwrap();
        // Nothing listens on port 9 of localhost
        let err = downloader()
            .download_as("http://127.0.0.1:9/v.mp4", dir.path(), "file.mp4", None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Http(_)));
        assert!(err.is_transient());
    }
}
