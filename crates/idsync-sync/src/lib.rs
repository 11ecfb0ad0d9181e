//! IdSync Sync - Reconciliation and change propagation engine
//!
//! Provides:
//! - Keyed snapshot diffing per entity type
//! - Full pull reconciliation of Users, Groups and Memberships
//! - Push propagation of local mutations to the remote directory
//! - The guard that keeps both directions from re-triggering each other
//!
//! ## Modules
//!
//! - [`diff`] - Pure create/update/delete classification of two snapshots
//! - [`guard`] - Re-entrancy lock and push suppression flag
//! - [`reconciler`] - One reconciliation pass (pull, diff, apply locally)
//! - [`scheduler`] - Fixed-interval driver for the reconciler
//! - [`propagator`] - Lifecycle hooks that push local changes remotely
//! - [`hooked_store`] - Store decorator that calls the hooks at each mutation

pub mod diff;
pub mod guard;
pub mod hooked_store;
pub mod propagator;
pub mod reconciler;
pub mod scheduler;

use idsync_core::domain::EntityKind;
use thiserror::Error;

pub use diff::{diff_snapshots, Diff};
pub use guard::{ReconciliationPermit, SyncGuard};
pub use hooked_store::HookedIdentityStore;
pub use propagator::ChangePropagator;
pub use reconciler::{EntityStats, ReconcileSummary, Reconciler, RunOutcome};
pub use scheduler::ReconciliationScheduler;

/// Errors that can occur while reconciling or propagating
///
/// Every variant names the entity type, the key and the operation so a
/// single log line is enough to diagnose the failure.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A call to the remote directory failed (transport or status)
    #[error("Directory {operation} of {entity} '{key}' failed: {source}")]
    Directory {
        entity: EntityKind,
        operation: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A read or write against the local store failed
    #[error("Store {operation} of {entity} '{key}' failed: {source}")]
    Store {
        entity: EntityKind,
        operation: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// A record could not be turned into what the operation needs
    #[error("Cannot {operation} {entity} '{key}': {reason}")]
    Mapping {
        entity: EntityKind,
        operation: &'static str,
        key: String,
        reason: String,
    },
}

impl SyncError {
    pub fn directory(
        entity: EntityKind,
        operation: &'static str,
        key: impl ToString,
        source: anyhow::Error,
    ) -> Self {
        Self::Directory {
            entity,
            operation,
            key: key.to_string(),
            source,
        }
    }

    pub fn store(
        entity: EntityKind,
        operation: &'static str,
        key: impl ToString,
        source: anyhow::Error,
    ) -> Self {
        Self::Store {
            entity,
            operation,
            key: key.to_string(),
            source,
        }
    }

    pub fn mapping(
        entity: EntityKind,
        operation: &'static str,
        key: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Mapping {
            entity,
            operation,
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Entity type the failed operation was working on
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Directory { entity, .. }
            | Self::Store { entity, .. }
            | Self::Mapping { entity, .. } => *entity,
        }
    }

    /// Whether the failure came from the remote directory
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

/// Key used in errors and logs for operations over a whole collection
pub(crate) const ALL: &str = "*";
