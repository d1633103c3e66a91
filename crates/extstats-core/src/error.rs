//! Shared error type across extstats crates.

use thiserror::Error;

/// Stable error codes (logs, tests, client-facing bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed report.
    BadRequest,
    /// Reading or writing persisted state failed.
    Storage,
    /// Invalid configuration.
    Config,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Storage => "STORAGE",
            ClientCode::Config => "CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Unified error type used by core and collector.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StatsError {
    /// Map internal error to a stable code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            StatsError::BadRequest(_) => ClientCode::BadRequest,
            StatsError::Storage(_) => ClientCode::Storage,
            StatsError::Config(_) => ClientCode::Config,
            StatsError::Internal(_) => ClientCode::Internal,
        }
    }
}

impl From<std::io::Error> for StatsError {
    fn from(e: std::io::Error) -> Self {
        StatsError::Storage(e.to_string())
    }
}
