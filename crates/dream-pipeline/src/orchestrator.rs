//! End-to-end generation: prompt in, processed video and thumbnail out.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use dream_luma::{GenerationProvider, LumaClient};
use dream_media::{
    FfmpegToolchain, MediaDownloader, MediaToolchain, ThumbnailExtractor, VideoProcessor,
};
use dream_models::{MediaArtifact, ModelError, PollingPolicy, PromptPlan, Stage, StageObserver};
use tracing::{debug, error, info, Instrument};

use crate::chainer::PromptChainer;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::poller::{CompletionPoller, Sleeper, TokioSleeper};
use crate::submit::JobSubmitter;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMedia {
    /// Name of the processed video inside the videos directory
    pub video_filename: String,
    /// Name of the thumbnail inside the thumbnails directory
    pub thumbnail_filename: String,
    /// Provider job whose asset was downloaded
    pub generation_id: String,
    /// Local paths written by the run
    pub artifact: MediaArtifact,
}

impl GeneratedMedia {
    /// `(video_filename, thumbnail_filename)`
    pub fn into_filenames(self) -> (String, String) {
        (self.video_filename, self.thumbnail_filename)
    }
}

/// Runs the stages in order: submit, poll, optionally extend, download,
/// process, thumbnail.
///
/// The first failing stage ends the run and its error is returned as-is.
/// Nothing is retried and files written by earlier stages stay on disk.
pub struct Pipeline {
    config: PipelineConfig,
    policy: PollingPolicy,
    submitter: JobSubmitter,
    poller: CompletionPoller,
    chainer: PromptChainer,
    downloader: MediaDownloader,
    processor: VideoProcessor,
    thumbnails: ThumbnailExtractor,
    observer: Option<Arc<dyn StageObserver>>,
}

impl Pipeline {
    /// Build a pipeline against the Luma API and the local FFmpeg install.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;

        let client = LumaClient::new(config.luma.clone())
            .map_err(|e| PipelineError::config(format!("invalid Luma client settings: {}", e)))?;
        let toolchain = match config.ffmpeg_timeout {
            Some(timeout) => FfmpegToolchain::with_timeout(timeout),
            None => FfmpegToolchain::new(),
        };

        Self::with_components(
            config,
            Arc::new(client),
            Arc::new(toolchain),
            Arc::new(TokioSleeper),
        )
    }

    /// Build from environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        Self::new(PipelineConfig::from_env())
    }

    /// Build with explicit collaborators.
    pub fn with_components(
        config: PipelineConfig,
        provider: Arc<dyn GenerationProvider>,
        toolchain: Arc<dyn MediaToolchain>,
        sleeper: Arc<dyn Sleeper>,
    ) -> PipelineResult<Self> {
        let policy = config.polling_policy()?;
        let downloader =
            MediaDownloader::new(config.download_timeout).map_err(PipelineError::Download)?;

        let submitter = JobSubmitter::new(provider.clone(), config.generation.clone());
        let poller = CompletionPoller::new(provider, sleeper);
        let chainer = PromptChainer::new(submitter.clone(), poller.clone());

        Ok(Self {
            policy,
            submitter,
            poller,
            chainer,
            downloader,
            processor: VideoProcessor::new(toolchain.clone()),
            thumbnails: ThumbnailExtractor::new(toolchain),
            observer: Some(Arc::new(JobLogger::default())),
            config,
        })
    }

    /// Report stage events to `observer` instead of the default [`JobLogger`].
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Generate with the configured extend flag.
    pub async fn generate_default(
        &self,
        prompt: &str,
        filename: &str,
    ) -> PipelineResult<GeneratedMedia> {
        self.generate(prompt, filename, self.config.extend).await
    }

    /// Generate a video for `prompt` and store it as `filename`.
    ///
    /// With `extend` set and a prompt of the form `base ***** extension`,
    /// the base clip is generated first and then continued; the delivered
    /// video is the extension's asset. Without the delimiter the whole
    /// prompt becomes one generation.
    pub async fn generate(
        &self,
        prompt: &str,
        filename: &str,
        extend: bool,
    ) -> PipelineResult<GeneratedMedia> {
        let span = JobLogger::default().create_span(filename, extend);
        let started = Instant::now();
        metrics::record_generation_started(extend);

        let result = self.run(prompt, filename, extend).instrument(span).await;

        match &result {
            Ok(media) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics::record_generation_completed(elapsed);
                info!(
                    generation_id = %media.generation_id,
                    video = %media.video_filename,
                    thumbnail = %media.thumbnail_filename,
                    duration_secs = elapsed,
                    "Generation finished"
                );
            }
            Err(e) => {
                let stage = e.stage().map(|s| s.as_str()).unwrap_or("setup");
                metrics::record_generation_failed(stage, e.kind());
                error!(stage = stage, error = %e, "Generation failed");
            }
        }

        result
    }

    async fn run(
        &self,
        prompt: &str,
        filename: &str,
        extend: bool,
    ) -> PipelineResult<GeneratedMedia> {
        validate_filename(filename)?;
        let observer = self.observer.as_deref();
        let processing = &self.config.processing;

        let plan = PromptPlan::new(prompt, extend);
        if extend && !plan.is_chained() {
            debug!("No extension segment in prompt, generating a single clip");
        }

        let mut job = timed(
            Stage::Submit,
            self.submitter.submit(plan.base_prompt(), observer),
        )
        .await?;
        let mut video_url = timed(
            Stage::Poll,
            self.poller.poll_job(&mut job, &self.policy, observer),
        )
        .await?;

        if let PromptPlan::Chained { extension, .. } = &plan {
            let (extension_job, url) = timed(
                Stage::Extend,
                self.chainer.extend(&job, extension, &self.policy, observer),
            )
            .await?;
            job = extension_job;
            video_url = url;
        }

        let raw_path = timed(
            Stage::Download,
            self.downloader
                .download_as(&video_url, &processing.videos_dir, filename, observer),
        )
        .await
        .map_err(PipelineError::Download)?;
        let artifact = MediaArtifact::downloaded(&raw_path);

        let processed_path = timed(
            Stage::Process,
            self.processor.process(&raw_path, &processing.filters, observer),
        )
        .await
        .map_err(|e| PipelineError::from_media(Stage::Process, e))?;
        let artifact = artifact.with_processed(&processed_path);

        let thumbnail_filename = timed(
            Stage::Thumbnail,
            self.thumbnails
                .extract(&processed_path, &processing.thumbs_dir, observer),
        )
        .await
        .map_err(|e| PipelineError::from_media(Stage::Thumbnail, e))?;
        let artifact = artifact.with_thumbnail(processing.thumbs_dir.join(&thumbnail_filename));

        Ok(GeneratedMedia {
            video_filename: filename.to_string(),
            thumbnail_filename,
            generation_id: job.id().to_string(),
            artifact,
        })
    }
}

async fn timed<F: Future>(stage: Stage, fut: F) -> F::Output {
    let started = Instant::now();
    let output = fut.await;
    metrics::record_stage_duration(stage.as_str(), started.elapsed().as_secs_f64());
    output
}

/// The output name must be a bare file name inside the videos directory.
fn validate_filename(filename: &str) -> PipelineResult<()> {
    let is_bare = Path::new(filename)
        .file_name()
        .map(|name| name == filename)
        .unwrap_or(false);
    if filename.trim().is_empty() || !is_bare {
        let message = format!("'{}' is not a file name", filename);
        return Err(ModelError::invalid_value("filename", message).into());
    }
    Ok(())
}
