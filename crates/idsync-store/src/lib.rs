//! IdSync Store - Local identity persistence
//!
//! SQLite-based replica of the remote directory:
//! - Users with their extension attributes
//! - Groups
//! - Group memberships keyed by (group, user)
//!
//! ## Architecture
//!
//! This crate implements the `IIdentityStore` port from `idsync-core` using
//! SQLite as the storage backend. It is a driven (secondary) adapter in the
//! hexagonal architecture and knows nothing about lifecycle hooks; those are
//! layered on top by the sync engine.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqliteIdentityStore`] - `IIdentityStore` implementation
//! - [`StoreError`] - Error types for store operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use idsync_store::{DatabasePool, SqliteIdentityStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/var/lib/idsync/idsync.db")).await?;
//! let store = SqliteIdentityStore::new(pool.pool().clone());
//! // Use store as IIdentityStore...
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqliteIdentityStore;

/// Errors that can occur during store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be converted to or from its domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// No row exists for the given key
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A record without identifier cannot be stored
    #[error("Cannot store {0} without identifier")]
    MissingIdentifier(&'static str),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::QueryFailed(e.to_string())
    }
}
