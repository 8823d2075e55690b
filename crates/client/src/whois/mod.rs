//! WHOIS XML API client for per-address country and owner.
//!
//! - Country: geolocation endpoint, `location.country`.
//! - Owner: WHOIS endpoint, `WhoisRecord.registryData.registrant.organization`.
//!
//! The API key is checked when a lookup runs, so the server can start without
//! one and report enrichment failures per request.

pub mod response;

pub use response::{GeoResponse, WhoisResponse};

use reqwest::header;
use serde::de::DeserializeOwned;
use sslwatch_core::IpInspector;
use std::sync::Arc;
use std::time::Duration;

use crate::ratelimit::RateLimiter;

/// Errors from the WHOIS XML API client.
#[derive(Debug, thiserror::Error)]
pub enum WhoisError {
    #[error("missing API key: SSLWATCH_WHOIS_API_KEY not set")]
    MissingApiKey,

    #[error("authentication failed: invalid API key")]
    AuthError,

    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{field} not present for {address}")]
    MissingField { field: &'static str, address: String },
}

impl From<reqwest::Error> for WhoisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { WhoisError::Timeout } else { WhoisError::Network(Arc::new(err)) }
    }
}

/// WHOIS client configuration.
#[derive(Debug, Clone)]
pub struct WhoisConfig {
    pub api_key: Option<String>,
    pub geoip_base_url: String,
    pub whois_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub min_interval: Duration,
}

impl WhoisConfig {
    pub fn from_app_config(config: &sslwatch_core::AppConfig) -> Self {
        Self {
            api_key: config.whois_api_key.clone(),
            geoip_base_url: config.geoip_base_url.clone(),
            whois_base_url: config.whois_base_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            min_interval: Duration::from_millis(100),
        }
    }
}

/// WHOIS XML API client.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    http: reqwest::Client,
    config: WhoisConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl WhoisClient {
    pub fn new(config: WhoisConfig) -> Result<Self, WhoisError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| WhoisError::Network(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Ok(Self { http, config, rate_limiter })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, WhoisError> {
        let api_key = self.config.api_key.as_deref().ok_or(WhoisError::MissingApiKey)?;

        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .query(&[("apiKey", api_key), ("outputFormat", "json")])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(WhoisError::AuthError);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(WhoisError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| WhoisError::Parse(e.to_string()))
    }

    /// Country code of `address`.
    pub async fn lookup_country(&self, address: &str) -> Result<String, WhoisError> {
        let geo: GeoResponse = self
            .get_json(&self.config.geoip_base_url, &[("ipAddress", address)])
            .await?;
        geo.country()
            .ok_or_else(|| WhoisError::MissingField { field: "location.country", address: address.to_string() })
    }

    /// Registrant organization of `address`.
    pub async fn lookup_owner(&self, address: &str) -> Result<String, WhoisError> {
        let whois: WhoisResponse = self
            .get_json(&self.config.whois_base_url, &[("domainName", address)])
            .await?;
        whois.organization().ok_or_else(|| WhoisError::MissingField {
            field: "registrant.organization",
            address: address.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl IpInspector for WhoisClient {
    async fn country(&self, address: &str) -> Result<String, sslwatch_core::Error> {
        self.lookup_country(address)
            .await
            .map_err(|e| sslwatch_core::Error::Country(e.to_string()))
    }

    async fn owner(&self, address: &str) -> Result<String, sslwatch_core::Error> {
        self.lookup_owner(address)
            .await
            .map_err(|e| sslwatch_core::Error::Owner(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, api_key: Option<&str>) -> WhoisConfig {
        WhoisConfig {
            api_key: api_key.map(str::to_string),
            geoip_base_url: format!("{}/geo", server.uri()),
            whois_base_url: format!("{}/whois", server.uri()),
            timeout: Duration::from_secs(5),
            user_agent: "sslwatch-test".into(),
            min_interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_country_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo"))
            .and(query_param("apiKey", "k"))
            .and(query_param("ipAddress", "8.8.8.8"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"location":{"country":"US"}}"#))
            .mount(&server)
            .await;

        let client = WhoisClient::new(config_for(&server, Some("k"))).unwrap();
        assert_eq!(client.country("8.8.8.8").await.unwrap(), "US");
    }

    #[tokio::test]
    async fn test_owner_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whois"))
            .and(query_param("domainName", "8.8.8.8"))
            .and(query_param("outputFormat", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"WhoisRecord":{"registryData":{"registrant":{"organization":"Google LLC"}}}}"#,
            ))
            .mount(&server)
            .await;

        let client = WhoisClient::new(config_for(&server, Some("k"))).unwrap();
        assert_eq!(client.owner("8.8.8.8").await.unwrap(), "Google LLC");
    }

    #[tokio::test]
    async fn test_missing_record_is_owner_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/whois"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ErrorMessage":{"msg":"no data"}}"#))
            .mount(&server)
            .await;

        let client = WhoisClient::new(config_for(&server, Some("k"))).unwrap();
        let err = client.owner("8.8.8.8").await.unwrap_err();
        assert_eq!(err.kind(), sslwatch_core::ErrorKind::Owner);
        assert!(err.message().contains("registrant.organization"));
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_request() {
        let server = MockServer::start().await;
        let client = WhoisClient::new(config_for(&server, None)).unwrap();

        let err = client.lookup_country("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, WhoisError::MissingApiKey));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = WhoisClient::new(config_for(&server, Some("bad"))).unwrap();
        let err = client.lookup_country("8.8.8.8").await.unwrap_err();
        assert!(matches!(err, WhoisError::AuthError));
    }
}
