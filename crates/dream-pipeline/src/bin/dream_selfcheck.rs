//! Startup check: configuration, media directories, FFmpeg and the Luma key.

use std::path::Path;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dream_luma::LumaClient;
use dream_media::{check_ffmpeg, check_ffprobe};
use dream_pipeline::PipelineConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = PipelineConfig::from_env();
    config.validate()?;
    info!(
        endpoint = %config.luma.generations_endpoint,
        model = %config.generation.model,
        extend = config.extend,
        "dream-selfcheck: starting"
    );

    ensure_dir(&config.processing.videos_dir).await?;
    ensure_dir(&config.processing.thumbs_dir).await?;

    let ffmpeg = check_ffmpeg()?;
    let ffprobe = check_ffprobe()?;
    info!(ffmpeg = %ffmpeg.display(), ffprobe = %ffprobe.display(), "Media tools found");

    let client = LumaClient::new(config.luma.clone())?;
    if !client.check_credentials().await? {
        return Err(anyhow::anyhow!("Luma rejected LUMALABS_API_KEY"));
    }

    info!("dream-selfcheck: ok");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("dream_pipeline=info".parse()?)
        .add_directive("dream_selfcheck=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {}", path.display(), e))
}
