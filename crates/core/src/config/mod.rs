//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SSLWATCH_*)
//! 2. TOML config file (if SSLWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SSLWATCH_*)
/// 2. TOML config file (if SSLWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite evaluation store.
    ///
    /// Set via SSLWATCH_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outgoing HTTP requests.
    ///
    /// Set via SSLWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SSLWATCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Seconds a stored evaluation shields the grader from a re-probe.
    ///
    /// Set via SSLWATCH_WAIT_WINDOW_SECS environment variable.
    #[serde(default = "default_wait_window_secs")]
    pub wait_window_secs: u64,

    /// Seconds the recent-evaluations list is served from memory.
    #[serde(default = "default_recent_ttl_secs")]
    pub recent_ttl_secs: u64,

    /// How far back change detection looks for the earlier evaluation.
    #[serde(default = "default_lookback_secs")]
    pub lookback_secs: u64,

    /// SSL Labs API root.
    #[serde(default = "default_ssllabs_base_url")]
    pub ssllabs_base_url: String,

    /// WHOIS XML API key used for country and owner lookups.
    ///
    /// Set via SSLWATCH_WHOIS_API_KEY environment variable.
    /// Required only when servers are enriched.
    #[serde(default)]
    pub whois_api_key: Option<String>,

    #[serde(default = "default_geoip_base_url")]
    pub geoip_base_url: String,

    #[serde(default = "default_whois_base_url")]
    pub whois_base_url: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sslwatch.sqlite")
}

fn default_user_agent() -> String {
    "sslwatch/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_wait_window_secs() -> u64 {
    20
}

fn default_recent_ttl_secs() -> u64 {
    20
}

fn default_lookback_secs() -> u64 {
    3_600
}

fn default_ssllabs_base_url() -> String {
    "https://api.ssllabs.com/api/v3".into()
}

fn default_geoip_base_url() -> String {
    "https://geoipify.whoisxmlapi.com/api/v1".into()
}

fn default_whois_base_url() -> String {
    "https://www.whoisxmlapi.com/whoisserver/WhoisService".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            wait_window_secs: default_wait_window_secs(),
            recent_ttl_secs: default_recent_ttl_secs(),
            lookback_secs: default_lookback_secs(),
            ssllabs_base_url: default_ssllabs_base_url(),
            whois_api_key: None,
            geoip_base_url: default_geoip_base_url(),
            whois_base_url: default_whois_base_url(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn wait_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.wait_window_secs as i64)
    }

    pub fn recent_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.recent_ttl_secs as i64)
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.lookback_secs as i64)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SSLWATCH_`
    /// 2. TOML file from `SSLWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SSLWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SSLWATCH_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the WHOIS API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_whois_api_key(&self) -> Result<&str, ConfigError> {
        self.whois_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "whois_api_key".into(),
            hint: "Set SSLWATCH_WHOIS_API_KEY environment variable".into(),
        })
    }
}
