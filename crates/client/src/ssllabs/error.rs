//! SSL Labs client error types.

use std::sync::Arc;

/// Errors from the SSL Labs API client.
#[derive(Debug, thiserror::Error)]
pub enum SslLabsError {
    /// The API refused the request because of request or assessment limits.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// The service is down for maintenance or overloaded.
    #[error("service unavailable: HTTP {status}")]
    Unavailable { status: u16 },

    /// Other HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// A required member was absent from the response.
    #[error("{0} TAG not present")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for SslLabsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SslLabsError::Timeout } else { SslLabsError::Network(Arc::new(err)) }
    }
}

impl From<SslLabsError> for sslwatch_core::Error {
    fn from(err: SslLabsError) -> Self {
        sslwatch_core::Error::Grading(err.to_string())
    }
}
