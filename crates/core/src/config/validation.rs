//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn check_range(field: &str, value: u64, min: u64, max: u64, unit: &str) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: format!("must be between {min} and {max} {unit}"),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `wait_window_secs` or `recent_ttl_secs` is outside 1s..=1h
    /// - `lookback_secs` is outside 1min..=1 week
    /// - `user_agent` is empty
    /// - a base URL is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("timeout_ms", self.timeout_ms, 100, 300_000, "ms")?;
        check_range("wait_window_secs", self.wait_window_secs, 1, 3_600, "seconds")?;
        check_range("recent_ttl_secs", self.recent_ttl_secs, 1, 3_600, "seconds")?;
        check_range("lookback_secs", self.lookback_secs, 60, 604_800, "seconds")?;

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        for (field, value) in [
            ("ssllabs_base_url", &self.ssllabs_base_url),
            ("geoip_base_url", &self.geoip_base_url),
            ("whois_base_url", &self.whois_base_url),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let low = AppConfig { timeout_ms: 50, ..Default::default() };
        let high = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(invalid_field(&low).as_deref(), Some("timeout_ms"));
        assert_eq!(invalid_field(&high).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_wait_window_zero() {
        let config = AppConfig { wait_window_secs: 0, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("wait_window_secs"));
    }

    #[test]
    fn test_validate_recent_ttl_too_long() {
        let config = AppConfig { recent_ttl_secs: 3_601, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("recent_ttl_secs"));
    }

    #[test]
    fn test_validate_lookback_too_short() {
        let config = AppConfig { lookback_secs: 59, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("lookback_secs"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let config = AppConfig { ssllabs_base_url: " ".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("ssllabs_base_url"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            wait_window_secs: 1,
            recent_ttl_secs: 1,
            lookback_secs: 60,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_values() {
        let config = AppConfig {
            timeout_ms: 300_000,
            wait_window_secs: 3_600,
            recent_ttl_secs: 3_600,
            lookback_secs: 604_800,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
