//! Lifecycle hook port (driving/primary port)
//!
//! The local store calls these hooks synchronously at each mutation point.
//! A hook that returns an error aborts the local write it guards, so the
//! caller sees the failure before the mutation completes.
//!
//! Users and groups get pre-create, pre-update and pre-delete hooks.
//! Memberships get post-create and pre-delete hooks. Pre-create hooks take
//! the record mutably so an implementation can assign the identifier
//! handed out by the remote directory before the local insert.

use crate::domain::{Group, Membership, ResourceId, User};

/// Callbacks around local mutations
#[async_trait::async_trait]
pub trait ILifecycleHooks: Send + Sync {
    // --- Users ---

    async fn before_create_user(&self, user: &mut User) -> anyhow::Result<()>;

    async fn before_update_user(&self, user: &mut User) -> anyhow::Result<()>;

    async fn before_delete_user(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Groups ---

    async fn before_create_group(&self, group: &mut Group) -> anyhow::Result<()>;

    async fn before_update_group(&self, group: &mut Group) -> anyhow::Result<()>;

    async fn before_delete_group(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Memberships ---

    async fn after_create_membership(&self, membership: &Membership) -> anyhow::Result<()>;

    async fn before_delete_membership(&self, membership: &Membership) -> anyhow::Result<()>;
}

/// Hooks that do nothing; used when local mutations must not leave the process
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycleHooks;

#[async_trait::async_trait]
impl ILifecycleHooks for NoopLifecycleHooks {
    async fn before_create_user(&self, _user: &mut User) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_update_user(&self, _user: &mut User) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_delete_user(&self, _id: &ResourceId) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_create_group(&self, _group: &mut Group) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_update_group(&self, _group: &mut Group) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_delete_group(&self, _id: &ResourceId) -> anyhow::Result<()> {
        Ok(())
    }

    async fn after_create_membership(&self, _membership: &Membership) -> anyhow::Result<()> {
        Ok(())
    }

    async fn before_delete_membership(&self, _membership: &Membership) -> anyhow::Result<()> {
        Ok(())
    }
}
