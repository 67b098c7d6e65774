//! Domain error model.

use thiserror::Error;

/// Result type used across the domain foundation.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures raised while building domain primitives (money, identifiers).
///
/// Business rule violations of the ledger have their own error type; this one
/// only covers malformed input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
