//! Unified error types for sslwatch.
//!
//! Every failure belongs to an [`ErrorKind`], and each kind carries a fixed
//! code/description pair that callers surface next to the raw message.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::rusqlite;

/// Failure categories with their public code and description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Storage,
    Grading,
    Timestamp,
    Icon,
    Title,
    Country,
    Owner,
    InvalidInput,
}

impl ErrorKind {
    /// Public error code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Storage => "601",
            ErrorKind::Grading => "602",
            ErrorKind::Timestamp => "603",
            ErrorKind::Icon => "701",
            ErrorKind::Title => "702",
            ErrorKind::Country => "801",
            ErrorKind::Owner => "802",
            ErrorKind::InvalidInput => "400",
        }
    }

    /// Human readable description of the failure category.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::Storage => "Error in database.",
            ErrorKind::Grading => "Error in SSLabs API.",
            ErrorKind::Timestamp => "Malformed evaluation timestamp.",
            ErrorKind::Icon => "Error getting Icon",
            ErrorKind::Title => "Error getting HTML Title",
            ErrorKind::Country => "Error getting country from WHOIS",
            ErrorKind::Owner => "Error getting owner from WHOIS",
            ErrorKind::InvalidInput => "Invalid input.",
        }
    }

    fn rpc_code(self) -> i32 {
        match self {
            ErrorKind::InvalidInput => -32602,
            ErrorKind::Storage | ErrorKind::Timestamp => -32002,
            ErrorKind::Grading => -32010,
            ErrorKind::Icon | ErrorKind::Title => -32011,
            ErrorKind::Country | ErrorKind::Owner => -32012,
        }
    }
}

/// Unified error types for the sslwatch service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty domain).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A required row was not present.
    #[error("STORAGE_ERROR: {0} not found")]
    NotFound(String),

    /// A persisted timestamp could not be parsed.
    #[error("TIMESTAMP_ERROR: {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    /// The grading service failed or answered with something unusable.
    #[error("GRADING_ERROR: {0}")]
    Grading(String),

    /// Favicon lookup failed.
    #[error("ICON_ERROR: {0}")]
    Icon(String),

    /// Page title lookup failed.
    #[error("TITLE_ERROR: {0}")]
    Title(String),

    /// IP country lookup failed.
    #[error("COUNTRY_ERROR: {0}")]
    Country(String),

    /// IP owner lookup failed.
    #[error("OWNER_ERROR: {0}")]
    Owner(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Database(_) | Error::MigrationFailed(_) | Error::NotFound(_) => ErrorKind::Storage,
            Error::Timestamp { .. } => ErrorKind::Timestamp,
            Error::Grading(_) => ErrorKind::Grading,
            Error::Icon(_) => ErrorKind::Icon,
            Error::Title(_) => ErrorKind::Title,
            Error::Country(_) => ErrorKind::Country,
            Error::Owner(_) => ErrorKind::Owner,
        }
    }

    /// Raw message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::MigrationFailed(msg)
            | Error::Grading(msg)
            | Error::Icon(msg)
            | Error::Title(msg)
            | Error::Country(msg)
            | Error::Owner(msg) => msg.clone(),
            Error::Database(e) => e.to_string(),
            Error::NotFound(what) => format!("{what} not found"),
            Error::Timestamp { value, reason } => format!("{value:?}: {reason}"),
        }
    }
}

/// Structured error triple reported to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ApiError {
    pub code: String,
    pub description: String,
    pub error_message: String,
}

impl From<&Error> for ApiError {
    fn from(err: &Error) -> Self {
        let kind = err.kind();
        ApiError {
            code: kind.code().to_string(),
            description: kind.description().to_string(),
            error_message: err.message(),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let kind = err.kind();
        let api = ApiError::from(&err);
        McpError {
            code: ErrorCode(kind.rpc_code()),
            message: format!("{}: {}", kind.description(), api.error_message).into(),
            data: serde_json::to_value(&api).ok(),
        }
    }
}
