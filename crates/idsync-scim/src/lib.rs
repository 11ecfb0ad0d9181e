//! IdSync SCIM - SCIM 2.0 directory adapter
//!
//! Provides:
//! - Typed wire structs for SCIM users, groups, list responses and patch
//!   messages, decoded defensively field by field
//! - A stateless mapper between wire records and domain entities
//! - An async HTTP client with Basic auth, paging and per-request timeout
//! - [`provider::ScimDirectoryClient`], the `IDirectoryClient` implementation
//!
//! ## Modules
//!
//! - [`schema`] - Wire structs and schema URIs
//! - [`mapper`] - Domain <-> wire translation
//! - [`client`] - HTTP client
//! - [`provider`] - Port adapter

pub mod client;
pub mod mapper;
pub mod provider;
pub mod schema;

use thiserror::Error;

/// Errors that can occur when talking to the SCIM directory
#[derive(Debug, Error)]
pub enum ScimError {
    /// Connection failure, timeout or undecodable body
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The directory answered with a non-success status code
    #[error("Directory returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as text (may be empty)
        body: String,
    },

    /// A single remote record lacks a mandatory field or cannot be read
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// The response envelope is malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client cannot be built from the given settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScimError {
    /// HTTP status code, when the error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            ScimError::Status { status, .. } => Some(*status),
            ScimError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result alias used throughout the crate
pub type ScimResult<T> = Result<T, ScimError>;
