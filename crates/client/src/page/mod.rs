//! Homepage inspector.
//!
//! Fetches `http://<domain>/` and reads the favicon reference and page title
//! from the HTML.
//!
//! ### Safety Gates
//! - The host is resolved first and every address must be public.
//! - Redirects are followed up to a limit; a redirect to a private IP literal
//!   stops the chain.
//! - The body is read up to `max_bytes`.

pub mod extract;

pub use extract::{extract_icon, extract_title};

use reqwest::{Client, header};
use sslwatch_core::PageInspector;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::ssrf::{SsrfError, is_private_or_reserved, resolve_public};

/// Errors from homepage fetching.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("blocked host: {0}")]
    Blocked(#[from] SsrfError),

    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("response too large: more than {0} bytes")]
    TooLarge(usize),

    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for PageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { PageError::Timeout } else { PageError::Network(Arc::new(err)) }
    }
}

/// Configuration for the homepage client.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// User agent string (default: "sslwatch/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 2MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            user_agent: "sslwatch/0.1".to_string(),
            max_bytes: 2 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl PageConfig {
    pub fn from_app_config(config: &sslwatch_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// HTTP client for domain homepages.
#[derive(Debug, Clone)]
pub struct PageClient {
    http: Client,
    config: PageConfig,
}

impl PageClient {
    /// Create a new homepage client with the given configuration.
    pub fn new(config: PageConfig) -> Result<Self, PageError> {
        let max_redirects = config.max_redirects;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= max_redirects {
                return attempt.error("too many redirects");
            }
            let private_target = attempt
                .url()
                .host_str()
                .and_then(|h| h.trim_matches(['[', ']']).parse::<std::net::IpAddr>().ok())
                .is_some_and(is_private_or_reserved);
            if private_target { attempt.stop() } else { attempt.follow() }
        });

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(policy)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| PageError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Fetch the homepage HTML of `domain`.
    pub async fn fetch_homepage(&self, domain: &str) -> Result<String, PageError> {
        let start = Instant::now();
        resolve_public(domain, 80).await?;

        let url = format!("http://{domain}/");
        let mut response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::HttpError { status: status.as_u16() });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(PageError::TooLarge(self.config.max_bytes));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.config.max_bytes {
                return Err(PageError::TooLarge(self.config.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        tracing::debug!("fetched {} in {}ms ({} bytes)", url, start.elapsed().as_millis(), body.len());

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait::async_trait]
impl PageInspector for PageClient {
    async fn icon(&self, domain: &str) -> Result<Option<String>, sslwatch_core::Error> {
        let html = self
            .fetch_homepage(domain)
            .await
            .map_err(|e| sslwatch_core::Error::Icon(e.to_string()))?;
        Ok(extract_icon(&html))
    }

    async fn title(&self, domain: &str) -> Result<Option<String>, sslwatch_core::Error> {
        let html = self
            .fetch_homepage(domain)
            .await
            .map_err(|e| sslwatch_core::Error::Title(e.to_string()))?;
        Ok(extract_title(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_config_default() {
        let config = PageConfig::default();
        assert_eq!(config.user_agent, "sslwatch/0.1");
        assert_eq!(config.max_bytes, 2 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[tokio::test]
    async fn test_page_client_new() {
        assert!(PageClient::new(PageConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_private_host_is_icon_error() {
        let client = PageClient::new(PageConfig::default()).unwrap();
        let err = client.icon("127.0.0.1").await.unwrap_err();
        assert_eq!(err.kind(), sslwatch_core::ErrorKind::Icon);
    }

    #[tokio::test]
    async fn test_private_host_is_title_error() {
        let client = PageClient::new(PageConfig::default()).unwrap();
        let err = client.title("10.0.0.1").await.unwrap_err();
        assert_eq!(err.kind(), sslwatch_core::ErrorKind::Title);
    }
}
