//! Luma Dream Machine HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{LumaError, LumaResult};
use crate::types::{GenerationRequest, GenerationStatus, SubmitResponse};

pub const DEFAULT_API_BASE: &str = "https://api.lumalabs.ai/dream-machine/v1";
pub const DEFAULT_GENERATIONS_ENDPOINT: &str =
    "https://api.lumalabs.ai/dream-machine/v1/generations";

/// Generation provider operations the pipeline depends on.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Submit a generation and return its id. No retries.
    async fn submit(&self, request: &GenerationRequest) -> LumaResult<String>;

    /// Fetch the current status of a generation.
    async fn status(&self, id: &str) -> LumaResult<GenerationStatus>;
}

/// Configuration for the Luma client.
#[derive(Debug, Clone)]
pub struct LumaClientConfig {
    /// Bearer token
    pub api_key: String,
    /// Generations collection URL
    pub generations_endpoint: String,
    /// API root, used for account endpoints
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for LumaClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            generations_endpoint: DEFAULT_GENERATIONS_ENDPOINT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl LumaClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("LUMALABS_API_KEY").unwrap_or_default(),
            generations_endpoint: std::env::var("LUMA_GENERATIONS_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_GENERATIONS_ENDPOINT.to_string()),
            api_base: std::env::var("LUMA_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(
                std::env::var("LUMA_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}

/// Client for the Luma generation API.
#[derive(Debug, Clone)]
pub struct LumaClient {
    http: Client,
    config: LumaClientConfig,
}

impl LumaClient {
    /// Create a new client; endpoints must be absolute URLs.
    pub fn new(config: LumaClientConfig) -> LumaResult<Self> {
        Url::parse(&config.generations_endpoint)?;
        Url::parse(&config.api_base)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LumaError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> LumaResult<Self> {
        Self::new(LumaClientConfig::from_env())
    }

    pub fn config(&self) -> &LumaClientConfig {
        &self.config
    }

    fn status_url(&self, id: &str) -> String {
        format!(
            "{}/{}",
            self.config.generations_endpoint.trim_end_matches('/'),
            id
        )
    }

    /// Check the API key against the credits endpoint.
    ///
    /// `Ok(false)` means the key was rejected; other statuses are errors.
    pub async fn check_credentials(&self) -> LumaResult<bool> {
        let url = format!("{}/credits", self.config.api_base.trim_end_matches('/'));

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => Ok(true),
            401 => {
                warn!("Luma rejected the configured API key");
                Ok(false)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(LumaError::request_failed(status, body))
            }
        }
    }
}

#[async_trait]
impl GenerationProvider for LumaClient {
    async fn submit(&self, request: &GenerationRequest) -> LumaResult<String> {
        debug!(
            endpoint = %self.config.generations_endpoint,
            parent = ?request.parent_id(),
            "Submitting generation"
        );

        let response = self
            .http
            .post(&self.config.generations_endpoint)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let body: SubmitResponse = read_json(response).await?;
        body.generation_id()
            .map(str::to_string)
            .ok_or(LumaError::MissingId)
    }

    async fn status(&self, id: &str) -> LumaResult<GenerationStatus> {
        let response = self
            .http
            .get(self.status_url(id))
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        read_json(response).await
    }
}

/// Fail on non-success statuses with the body attached, else decode JSON.
async fn read_json<T: DeserializeOwned>(response: Response) -> LumaResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(LumaError::request_failed(status.as_u16(), body));
    }

    Ok(serde_json::from_str(&body)?)
}
