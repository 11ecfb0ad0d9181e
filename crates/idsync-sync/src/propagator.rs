//! ChangePropagator - pushes local mutations to the remote directory
//!
//! Implements [`ILifecycleHooks`], so it runs synchronously inside the
//! local write that triggered it: the caller sees the outcome of the remote
//! call before its own write completes.
//!
//! ## Hooks
//!
//! | Hook                     | Remote call                                   |
//! |--------------------------|-----------------------------------------------|
//! | before create user/group | create, adopt the assigned id on the record   |
//! | before update user/group | replace by id (groups also send members)      |
//! | before delete user/group | local membership cleanup, then remote delete  |
//! | after create membership  | PATCH add member                              |
//! | before delete membership | PATCH remove member                           |
//!
//! Every hook first checks [`SyncGuard::is_push_suppressed`]. While a
//! reconciliation pass is writing, the remote side already holds the
//! change and nothing is pushed.

use std::sync::Arc;

use tracing::{debug, info};

use idsync_core::domain::{EntityKind, Group, Membership, ResourceId, User};
use idsync_core::ports::{IDirectoryClient, IIdentityStore, ILifecycleHooks};

use crate::guard::SyncGuard;
use crate::SyncError;

/// Lifecycle hooks that mirror local changes to the remote directory
pub struct ChangePropagator {
    directory: Arc<dyn IDirectoryClient>,
    /// Undecorated store; cleanup through it must not re-enter these hooks
    store: Arc<dyn IIdentityStore>,
    guard: Arc<SyncGuard>,
}

impl ChangePropagator {
    pub fn new(
        directory: Arc<dyn IDirectoryClient>,
        store: Arc<dyn IIdentityStore>,
        guard: Arc<SyncGuard>,
    ) -> Self {
        Self {
            directory,
            store,
            guard,
        }
    }

    fn suppressed(&self, hook: &'static str) -> bool {
        let suppressed = self.guard.is_push_suppressed();
        if suppressed {
            debug!(hook, "Reconciliation in progress, push skipped");
        }
        suppressed
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn push_user_create(&self, user: &mut User) -> Result<(), SyncError> {
        let created = self
            .directory
            .create_user(user)
            .await
            .map_err(|e| SyncError::directory(EntityKind::User, "create", user.label(), e))?;
        let id = created.id.ok_or_else(|| {
            SyncError::mapping(
                EntityKind::User,
                "create",
                user.label(),
                "directory did not assign an id",
            )
        })?;

        info!(id = %id, login = user.label(), "Created user in directory");
        user.id = Some(id);
        Ok(())
    }

    async fn push_user_update(&self, id: &ResourceId, user: &User) -> Result<(), SyncError> {
        self.directory
            .update_user(id, user)
            .await
            .map_err(|e| SyncError::directory(EntityKind::User, "update", id, e))?;
        info!(id = %id, "Updated user in directory");
        Ok(())
    }

    async fn push_user_delete(&self, id: &ResourceId) -> Result<(), SyncError> {
        let existing = self
            .store
            .get_user(id)
            .await
            .map_err(|e| SyncError::store(EntityKind::User, "read", id, e))?;
        if existing.is_none() {
            debug!(id = %id, "User not stored locally, nothing to delete remotely");
            return Ok(());
        }

        let removed = self
            .store
            .delete_memberships_for_user(id)
            .await
            .map_err(|e| SyncError::store(EntityKind::Membership, "delete", id, e))?;
        debug!(id = %id, removed, "Removed local memberships of user");

        self.directory
            .delete_user(id)
            .await
            .map_err(|e| SyncError::directory(EntityKind::User, "delete", id, e))?;
        info!(id = %id, "Deleted user from directory");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    async fn push_group_create(&self, group: &mut Group) -> Result<(), SyncError> {
        let created = self.directory.create_group(group).await.map_err(|e| {
            SyncError::directory(EntityKind::Group, "create", &group.display_name, e)
        })?;
        let id = created.id.ok_or_else(|| {
            SyncError::mapping(
                EntityKind::Group,
                "create",
                &group.display_name,
                "directory did not assign an id",
            )
        })?;

        info!(id = %id, display_name = %group.display_name, "Created group in directory");
        group.id = Some(id);
        Ok(())
    }

    async fn push_group_update(&self, id: &ResourceId, group: &Group) -> Result<(), SyncError> {
        // A replace carries the member list; send what is known locally
        let members: Vec<ResourceId> = self
            .store
            .list_memberships()
            .await
            .map_err(|e| SyncError::store(EntityKind::Membership, "list", id, e))?
            .into_iter()
            .filter(|m| &m.group_id == id)
            .map(|m| m.user_id)
            .collect();

        self.directory
            .update_group(id, group, &members)
            .await
            .map_err(|e| SyncError::directory(EntityKind::Group, "update", id, e))?;
        info!(id = %id, members = members.len(), "Updated group in directory");
        Ok(())
    }

    async fn push_group_delete(&self, id: &ResourceId) -> Result<(), SyncError> {
        let existing = self
            .store
            .get_group(id)
            .await
            .map_err(|e| SyncError::store(EntityKind::Group, "read", id, e))?;
        if existing.is_none() {
            debug!(id = %id, "Group not stored locally, nothing to delete remotely");
            return Ok(());
        }

        let removed = self
            .store
            .delete_memberships_for_group(id)
            .await
            .map_err(|e| SyncError::store(EntityKind::Membership, "delete", id, e))?;
        debug!(id = %id, removed, "Removed local memberships of group");

        self.directory
            .delete_group(id)
            .await
            .map_err(|e| SyncError::directory(EntityKind::Group, "delete", id, e))?;
        info!(id = %id, "Deleted group from directory");
        Ok(())
    }
}

#[async_trait::async_trait]
impl ILifecycleHooks for ChangePropagator {
    async fn before_create_user(&self, user: &mut User) -> anyhow::Result<()> {
        if self.suppressed("before_create_user") {
            return Ok(());
        }
        // An id means the record already exists remotely
        match user.id.clone() {
            Some(id) => self.push_user_update(&id, user).await?,
            None => self.push_user_create(user).await?,
        }
        Ok(())
    }

    async fn before_update_user(&self, user: &mut User) -> anyhow::Result<()> {
        if self.suppressed("before_update_user") {
            return Ok(());
        }
        match user.id.clone() {
            Some(id) => self.push_user_update(&id, user).await?,
            None => self.push_user_create(user).await?,
        }
        Ok(())
    }

    async fn before_delete_user(&self, id: &ResourceId) -> anyhow::Result<()> {
        if self.suppressed("before_delete_user") {
            return Ok(());
        }
        self.push_user_delete(id).await?;
        Ok(())
    }

    async fn before_create_group(&self, group: &mut Group) -> anyhow::Result<()> {
        if self.suppressed("before_create_group") {
            return Ok(());
        }
        match group.id.clone() {
            Some(id) => self.push_group_update(&id, group).await?,
            None => self.push_group_create(group).await?,
        }
        Ok(())
    }

    async fn before_update_group(&self, group: &mut Group) -> anyhow::Result<()> {
        if self.suppressed("before_update_group") {
            return Ok(());
        }
        match group.id.clone() {
            Some(id) => self.push_group_update(&id, group).await?,
            None => self.push_group_create(group).await?,
        }
        Ok(())
    }

    async fn before_delete_group(&self, id: &ResourceId) -> anyhow::Result<()> {
        if self.suppressed("before_delete_group") {
            return Ok(());
        }
        self.push_group_delete(id).await?;
        Ok(())
    }

    async fn after_create_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        if self.suppressed("after_create_membership") {
            return Ok(());
        }
        self.directory
            .add_group_member(&membership.group_id, &membership.user_id)
            .await
            .map_err(|e| SyncError::directory(EntityKind::Membership, "add", membership, e))?;
        info!(%membership, "Added member in directory");
        Ok(())
    }

    async fn before_delete_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        if self.suppressed("before_delete_membership") {
            return Ok(());
        }
        self.directory
            .remove_group_member(&membership.group_id, &membership.user_id)
            .await
            .map_err(|e| SyncError::directory(EntityKind::Membership, "remove", membership, e))?;
        info!(%membership, "Removed member in directory");
        Ok(())
    }
}
