//! Domain error types
//!
//! Validation failures raised while constructing identifiers and records.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identifier is empty or otherwise unusable
    #[error("Invalid resource ID: {0}")]
    InvalidResourceId(String),

    /// A record lacks the identifier required for the requested operation
    #[error("Missing identifier on {0}")]
    MissingIdentifier(String),

    /// Unknown user status value
    #[error("Invalid user status: {0}")]
    InvalidStatus(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
