//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
///
/// These are raised before any I/O happens: malformed identifiers and
/// payloads that would be rejected by the server are caught locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} too long: {len} > max {max} characters")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl DomainError {
    /// Check if this is a validation error (all domain errors currently are)
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidId(_) | Self::Empty { .. } | Self::TooLong { .. }
        )
    }
}
