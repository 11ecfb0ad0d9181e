//! HookedIdentityStore - store decorator that dispatches lifecycle hooks
//!
//! Wraps any [`IIdentityStore`] and calls an [`ILifecycleHooks`]
//! implementation synchronously around each mutation:
//!
//! | Mutation             | Hook                          | Timing      |
//! |----------------------|-------------------------------|-------------|
//! | insert user / group  | `before_create_*`             | before      |
//! | update user / group  | `before_update_*`             | before      |
//! | delete user / group  | `before_delete_*`             | before      |
//! | insert membership    | `after_create_membership`     | after       |
//! | delete membership    | `before_delete_membership`    | before      |
//!
//! A failing "before" hook aborts the write. A failing "after" hook is
//! returned to the caller with the row already written, marking the
//! membership as stored locally but not pushed.
//!
//! Bulk membership cleanup (`delete_memberships_for_*`) bypasses the hooks.
//! Reads are passed straight through.

use std::sync::Arc;

use idsync_core::domain::{Group, Membership, ResourceId, User};
use idsync_core::ports::{IIdentityStore, ILifecycleHooks};

/// Identity store whose mutations go through lifecycle hooks
#[derive(Clone)]
pub struct HookedIdentityStore {
    inner: Arc<dyn IIdentityStore>,
    hooks: Arc<dyn ILifecycleHooks>,
}

impl HookedIdentityStore {
    pub fn new(inner: Arc<dyn IIdentityStore>, hooks: Arc<dyn ILifecycleHooks>) -> Self {
        Self { inner, hooks }
    }

    /// The undecorated store
    pub fn inner(&self) -> &Arc<dyn IIdentityStore> {
        &self.inner
    }
}

impl std::fmt::Debug for HookedIdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookedIdentityStore").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl IIdentityStore for HookedIdentityStore {
    // --- Users ---

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.inner.list_users().await
    }

    async fn get_user(&self, id: &ResourceId) -> anyhow::Result<Option<User>> {
        self.inner.get_user(id).await
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<ResourceId> {
        let mut record = user.clone();
        self.hooks.before_create_user(&mut record).await?;
        self.inner.insert_user(&record).await
    }

    async fn update_user(&self, id: &ResourceId, user: &User) -> anyhow::Result<()> {
        let mut record = user.clone();
        record.id = Some(id.clone());
        self.hooks.before_update_user(&mut record).await?;
        self.inner.update_user(id, &record).await
    }

    async fn delete_user(&self, id: &ResourceId) -> anyhow::Result<()> {
        self.hooks.before_delete_user(id).await?;
        self.inner.delete_user(id).await
    }

    // --- Groups ---

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        self.inner.list_groups().await
    }

    async fn get_group(&self, id: &ResourceId) -> anyhow::Result<Option<Group>> {
        self.inner.get_group(id).await
    }

    async fn insert_group(&self, group: &Group) -> anyhow::Result<ResourceId> {
        let mut record = group.clone();
        self.hooks.before_create_group(&mut record).await?;
        self.inner.insert_group(&record).await
    }

    async fn update_group(&self, id: &ResourceId, group: &Group) -> anyhow::Result<()> {
        let mut record = group.clone();
        record.id = Some(id.clone());
        self.hooks.before_update_group(&mut record).await?;
        self.inner.update_group(id, &record).await
    }

    async fn delete_group(&self, id: &ResourceId) -> anyhow::Result<()> {
        self.hooks.before_delete_group(id).await?;
        self.inner.delete_group(id).await
    }

    // --- Memberships ---

    async fn list_memberships(&self) -> anyhow::Result<Vec<Membership>> {
        self.inner.list_memberships().await
    }

    async fn insert_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        self.inner.insert_membership(membership).await?;
        self.hooks.after_create_membership(membership).await
    }

    async fn delete_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        self.hooks.before_delete_membership(membership).await?;
        self.inner.delete_membership(membership).await
    }

    async fn delete_memberships_for_user(&self, user_id: &ResourceId) -> anyhow::Result<u64> {
        self.inner.delete_memberships_for_user(user_id).await
    }

    async fn delete_memberships_for_group(&self, group_id: &ResourceId) -> anyhow::Result<u64> {
        self.inner.delete_memberships_for_group(group_id).await
    }
}
