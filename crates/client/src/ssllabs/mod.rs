//! SSL Labs API client.
//!
//! Polls the v3 `analyze` endpoint for a host and turns the assessment into
//! an unsaved [`Evaluation`].
//!
//! ### Specification
//!
//! - **Endpoint**: `{base_url}/analyze?host=<domain>`
//! - **Rate Limiting**: requests are paced by a minimum interval; 429 and
//!   503/529 answers are reported, never retried here.
//! - **Normalization**: `DNS`/`IN_PROGRESS` map to in progress, `ERROR` to
//!   down, anything else to a graded result built from `endpoints`.

pub mod error;
pub mod response;

pub use error::SslLabsError;
pub use response::{AnalyzeResponse, AssessmentStatus, Endpoint};

use reqwest::header;
use sslwatch_core::{Evaluation, Evaluator};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ratelimit::RateLimiter;

/// Default base URL for the SSL Labs API.
const DEFAULT_BASE_URL: &str = "https://api.ssllabs.com/api/v3";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "sslwatch/0.1";

/// Minimum interval between requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// SSL Labs client configuration.
#[derive(Debug, Clone)]
pub struct SslLabsConfig {
    /// Base URL (default: https://api.ssllabs.com/api/v3).
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// User-agent string (default: sslwatch/0.x).
    pub user_agent: String,
    /// Minimum spacing between two requests (default: 1s).
    pub min_interval: Duration,
}

impl Default for SslLabsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_interval: MIN_REQUEST_INTERVAL,
        }
    }
}

impl SslLabsConfig {
    pub fn from_app_config(config: &sslwatch_core::AppConfig) -> Self {
        Self {
            base_url: config.ssllabs_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            ..Default::default()
        }
    }
}

/// SSL Labs API client.
#[derive(Debug, Clone)]
pub struct SslLabsClient {
    http: reqwest::Client,
    config: SslLabsConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl SslLabsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: SslLabsConfig) -> Result<Self, SslLabsError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SslLabsError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Ok(Self { http, config, rate_limiter })
    }

    /// Fetch the current assessment state for `host`.
    ///
    /// Starts a new assessment if none is running.
    pub async fn analyze(&self, host: &str) -> Result<AnalyzeResponse, SslLabsError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let url = format!("{}/analyze", self.config.base_url.trim_end_matches('/'));

        tracing::debug!("requesting SSL Labs assessment: host={}", host);

        let http_response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[("host", host)])
            .send()
            .await?;

        let status = http_response.status();
        tracing::debug!("SSL Labs response status: {}", status);

        if status == 429 {
            return Err(SslLabsError::RateLimited);
        }

        if status == 503 || status == 529 {
            return Err(SslLabsError::Unavailable { status: status.as_u16() });
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(SslLabsError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let analysis: AnalyzeResponse =
            serde_json::from_slice(&bytes).map_err(|e| SslLabsError::Parse(e.to_string()))?;

        tracing::debug!(
            "assessment fetched in {:?}, status={:?}, {} endpoints",
            start.elapsed(),
            analysis.status,
            analysis.endpoints.as_ref().map_or(0, Vec::len)
        );

        Ok(analysis)
    }
}

#[async_trait::async_trait]
impl Evaluator for SslLabsClient {
    async fn evaluate(&self, domain: &str) -> Result<Evaluation, sslwatch_core::Error> {
        let evaluation = self.analyze(domain).await?.into_evaluation()?;
        Ok(evaluation)
    }
}
