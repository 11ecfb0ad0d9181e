//! Reconciler - one full pull reconciliation pass
//!
//! A pass pulls the remote directory's state and makes the local store match
//! it, one entity type at a time, in a fixed order:
//!
//! 1. Users
//! 2. Groups
//! 3. Memberships (keyed on identifiers the first two steps stored)
//!
//! For each type the remote snapshot and the local snapshot are diffed with
//! [`diff_snapshots`] and the three result sets are applied as local writes.
//!
//! ## Coordination
//!
//! The pass holds a [`ReconciliationPermit`](crate::guard::ReconciliationPermit)
//! from start to finish. While it is held, a second call to
//! [`Reconciler::run_once`] returns [`RunOutcome::Skipped`] and the change
//! propagator pushes nothing, so the pass's own writes through the hooked
//! store stay local.
//!
//! ## Failure
//!
//! The first error aborts the rest of the pass. Writes already applied are
//! kept; the next pass starts again from fresh snapshots.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use idsync_core::domain::{EntityKind, Group, Membership, ResourceId, User};
use idsync_core::ports::{IDirectoryClient, IIdentityStore};

use crate::diff::diff_snapshots;
use crate::guard::SyncGuard;
use crate::{SyncError, ALL};

/// Writes applied to one entity type during a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    pub created: u32,
    pub updated: u32,
    pub deleted: u32,
    /// Present on both sides with equal contents, update skipped
    pub unchanged: u32,
}

impl EntityStats {
    /// Number of local writes this entity type received
    pub fn writes(&self) -> u32 {
        self.created + self.updated + self.deleted
    }
}

/// Result of a completed reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub users: EntityStats,
    pub groups: EntityStats,
    pub memberships: EntityStats,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl ReconcileSummary {
    /// Number of local writes across all entity types
    pub fn total_writes(&self) -> u32 {
        self.users.writes() + self.groups.writes() + self.memberships.writes()
    }
}

/// What happened when a pass was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pass ran to the end
    Completed(ReconcileSummary),
    /// Another pass held the lock; nothing was done
    Skipped,
}

/// Pulls the remote directory into the local store
pub struct Reconciler {
    directory: Arc<dyn IDirectoryClient>,
    /// Hook-dispatching store, so writes look like any other local mutation
    store: Arc<dyn IIdentityStore>,
    guard: Arc<SyncGuard>,
    skip_unchanged: bool,
}

impl Reconciler {
    pub fn new(
        directory: Arc<dyn IDirectoryClient>,
        store: Arc<dyn IIdentityStore>,
        guard: Arc<SyncGuard>,
    ) -> Self {
        Self {
            directory,
            store,
            guard,
            skip_unchanged: false,
        }
    }

    /// Skip updates whose remote record equals the local one
    ///
    /// Off by default: every record present on both sides is rewritten.
    pub fn with_skip_unchanged(mut self, skip_unchanged: bool) -> Self {
        self.skip_unchanged = skip_unchanged;
        self
    }

    /// Runs one pass unless another one is already in flight
    ///
    /// # Errors
    ///
    /// Returns the first [`SyncError`] hit by the pass. Entity types already
    /// reconciled at that point keep their writes.
    #[tracing::instrument(skip(self))]
    pub async fn run_once(&self) -> Result<RunOutcome, SyncError> {
        let Some(permit) = self.guard.try_begin_reconciliation() else {
            warn!("Reconciliation already running, request ignored");
            return Ok(RunOutcome::Skipped);
        };

        info!(skip_unchanged = self.skip_unchanged, "Starting reconciliation pass");
        let start = Instant::now();
        let result = self.reconcile_all().await;
        permit.end();

        match result {
            Ok(mut summary) => {
                summary.duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    users_created = summary.users.created,
                    users_updated = summary.users.updated,
                    users_deleted = summary.users.deleted,
                    groups_created = summary.groups.created,
                    groups_updated = summary.groups.updated,
                    groups_deleted = summary.groups.deleted,
                    memberships_created = summary.memberships.created,
                    memberships_deleted = summary.memberships.deleted,
                    duration_ms = summary.duration_ms,
                    "Reconciliation pass completed"
                );
                Ok(RunOutcome::Completed(summary))
            }
            Err(e) => {
                error!(
                    entity = %e.entity(),
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Reconciliation pass aborted"
                );
                Err(e)
            }
        }
    }

    async fn reconcile_all(&self) -> Result<ReconcileSummary, SyncError> {
        let users = self.reconcile_users().await?;
        let groups = self.reconcile_groups().await?;
        let memberships = self.reconcile_memberships().await?;

        Ok(ReconcileSummary {
            users,
            groups,
            memberships,
            duration_ms: 0,
        })
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn reconcile_users(&self) -> Result<EntityStats, SyncError> {
        let remote: HashMap<ResourceId, User> = self
            .directory
            .list_users()
            .await
            .map_err(|e| SyncError::directory(EntityKind::User, "list", ALL, e))?
            .into_iter()
            .filter_map(|user| user.id.clone().map(|id| (id, user)))
            .collect();
        let local: HashMap<ResourceId, User> = self
            .store
            .list_users()
            .await
            .map_err(|e| SyncError::store(EntityKind::User, "list", ALL, e))?
            .into_iter()
            .filter_map(|user| user.id.clone().map(|id| (id, user)))
            .collect();

        let diff = diff_snapshots(&local, &remote);
        debug!(
            remote = remote.len(),
            local = local.len(),
            create = diff.to_create.len(),
            update = diff.to_update.len(),
            delete = diff.to_delete.len(),
            "Diffed users"
        );

        let mut stats = EntityStats::default();

        for id in &diff.to_create {
            let Some(user) = remote.get(id) else { continue };
            self.store
                .insert_user(user)
                .await
                .map_err(|e| SyncError::store(EntityKind::User, "insert", id, e))?;
            debug!(id = %id, "Stored new user");
            stats.created += 1;
        }

        for id in &diff.to_update {
            let Some(user) = remote.get(id) else { continue };
            if self.skip_unchanged && local.get(id) == Some(user) {
                stats.unchanged += 1;
                continue;
            }
            self.store
                .update_user(id, user)
                .await
                .map_err(|e| SyncError::store(EntityKind::User, "update", id, e))?;
            stats.updated += 1;
        }

        for id in &diff.to_delete {
            self.store
                .delete_user(id)
                .await
                .map_err(|e| SyncError::store(EntityKind::User, "delete", id, e))?;
            debug!(id = %id, "Removed user missing from directory");
            stats.deleted += 1;
        }

        Ok(stats)
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    async fn reconcile_groups(&self) -> Result<EntityStats, SyncError> {
        let remote: HashMap<ResourceId, Group> = self
            .directory
            .list_groups()
            .await
            .map_err(|e| SyncError::directory(EntityKind::Group, "list", ALL, e))?
            .into_iter()
            .filter_map(|remote| remote.group.id.clone().map(|id| (id, remote.group)))
            .collect();
        let local: HashMap<ResourceId, Group> = self
            .store
            .list_groups()
            .await
            .map_err(|e| SyncError::store(EntityKind::Group, "list", ALL, e))?
            .into_iter()
            .filter_map(|group| group.id.clone().map(|id| (id, group)))
            .collect();

        let diff = diff_snapshots(&local, &remote);
        debug!(
            remote = remote.len(),
            local = local.len(),
            create = diff.to_create.len(),
            update = diff.to_update.len(),
            delete = diff.to_delete.len(),
            "Diffed groups"
        );

        let mut stats = EntityStats::default();

        for id in &diff.to_create {
            let Some(group) = remote.get(id) else { continue };
            self.store
                .insert_group(group)
                .await
                .map_err(|e| SyncError::store(EntityKind::Group, "insert", id, e))?;
            debug!(id = %id, "Stored new group");
            stats.created += 1;
        }

        for id in &diff.to_update {
            let Some(group) = remote.get(id) else { continue };
            if self.skip_unchanged && local.get(id) == Some(group) {
                stats.unchanged += 1;
                continue;
            }
            self.store
                .update_group(id, group)
                .await
                .map_err(|e| SyncError::store(EntityKind::Group, "update", id, e))?;
            stats.updated += 1;
        }

        for id in &diff.to_delete {
            self.store
                .delete_group(id)
                .await
                .map_err(|e| SyncError::store(EntityKind::Group, "delete", id, e))?;
            debug!(id = %id, "Removed group missing from directory");
            stats.deleted += 1;
        }

        Ok(stats)
    }

    // ------------------------------------------------------------------
    // Memberships
    // ------------------------------------------------------------------

    async fn reconcile_memberships(&self) -> Result<EntityStats, SyncError> {
        let remote: HashMap<Membership, ()> = self
            .directory
            .list_groups()
            .await
            .map_err(|e| SyncError::directory(EntityKind::Membership, "list", ALL, e))?
            .into_iter()
            .filter_map(|remote| {
                let group_id = remote.group.id?;
                Some(
                    remote
                        .members
                        .into_iter()
                        .map(move |user_id| (Membership::new(group_id.clone(), user_id), ())),
                )
            })
            .flatten()
            .collect();
        let local: HashMap<Membership, ()> = self
            .store
            .list_memberships()
            .await
            .map_err(|e| SyncError::store(EntityKind::Membership, "list", ALL, e))?
            .into_iter()
            .map(|m| (m, ()))
            .collect();

        let diff = diff_snapshots(&local, &remote);
        debug!(
            remote = remote.len(),
            local = local.len(),
            create = diff.to_create.len(),
            delete = diff.to_delete.len(),
            "Diffed memberships"
        );

        let mut stats = EntityStats::default();

        for membership in &diff.to_create {
            self.store
                .insert_membership(membership)
                .await
                .map_err(|e| SyncError::store(EntityKind::Membership, "insert", membership, e))?;
            debug!(%membership, "Stored new membership");
            stats.created += 1;
        }

        // A pair carries no attributes; present on both sides means up to date
        stats.unchanged = diff.to_update.len() as u32;

        for membership in &diff.to_delete {
            self.store
                .delete_membership(membership)
                .await
                .map_err(|e| SyncError::store(EntityKind::Membership, "delete", membership, e))?;
            debug!(%membership, "Removed membership missing from directory");
            stats.deleted += 1;
        }

        Ok(stats)
    }
}
