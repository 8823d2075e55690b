//! Startup errors for the sslwatch server.
//!
//! Request-time failures use `sslwatch_core::Error`; these only cover wiring
//! the server together before it starts serving.

use sslwatch_client::{PageError, SslLabsError, WhoisError};

/// Failures while building the server state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Evaluation store could not be opened or migrated.
    #[error("STORE_UNAVAILABLE: {0}")]
    Store(#[from] sslwatch_core::Error),

    #[error("SSLLABS_CLIENT: {0}")]
    SslLabs(#[from] SslLabsError),

    #[error("PAGE_CLIENT: {0}")]
    Page(#[from] PageError),

    #[error("WHOIS_CLIENT: {0}")]
    Whois(#[from] WhoisError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StartupError::from(sslwatch_core::Error::MigrationFailed("bad version".into()));
        assert!(err.to_string().starts_with("STORE_UNAVAILABLE"));
        assert!(err.to_string().contains("bad version"));
    }
}
