//! REST layer errors

use botway_core::DomainError;
use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for the REST layer
pub type RestResult<T> = Result<T, RestError>;

/// REST layer errors
#[derive(Debug, Error)]
pub enum RestError {
    #[error("request cancelled")]
    Cancelled,

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid {0} header value")]
    InvalidHeader(&'static str),

    #[error("request task failed: {0}")]
    Task(String),

    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RestError {
    /// Check if the failure is transient at the transport layer
    /// (as opposed to a rejected or malformed request).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Connection(_) | Self::Task(_))
    }
}
