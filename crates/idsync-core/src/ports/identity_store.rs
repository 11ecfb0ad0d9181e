//! Identity store port (driven/secondary port)
//!
//! CRUD access to the local copy of users, groups and memberships.
//! Users and groups are keyed by their [`ResourceId`], memberships by the
//! composite [`Membership`] pair.
//!
//! ## Implementation Notes
//!
//! - Implementations should make every single operation atomic.
//! - `insert_*` requires the record to carry an identifier; a record
//!   without one has not been pushed to the directory yet.
//! - Deleting a key that does not exist is not an error.

use crate::domain::{Group, Membership, ResourceId, User};

/// Port trait for the local identity store
#[async_trait::async_trait]
pub trait IIdentityStore: Send + Sync {
    // --- Users ---

    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    async fn get_user(&self, id: &ResourceId) -> anyhow::Result<Option<User>>;

    /// Inserts a user and returns the key it was stored under
    async fn insert_user(&self, user: &User) -> anyhow::Result<ResourceId>;

    /// Overwrites the user stored under `id`
    async fn update_user(&self, id: &ResourceId, user: &User) -> anyhow::Result<()>;

    async fn delete_user(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Groups ---

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>>;

    async fn get_group(&self, id: &ResourceId) -> anyhow::Result<Option<Group>>;

    /// Inserts a group and returns the key it was stored under
    async fn insert_group(&self, group: &Group) -> anyhow::Result<ResourceId>;

    /// Overwrites the group stored under `id`
    async fn update_group(&self, id: &ResourceId, group: &Group) -> anyhow::Result<()>;

    async fn delete_group(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Memberships ---

    async fn list_memberships(&self) -> anyhow::Result<Vec<Membership>>;

    /// Inserts a membership; inserting an existing pair is a no-op
    async fn insert_membership(&self, membership: &Membership) -> anyhow::Result<()>;

    async fn delete_membership(&self, membership: &Membership) -> anyhow::Result<()>;

    /// Deletes every membership of a user and returns how many rows went away
    async fn delete_memberships_for_user(&self, user_id: &ResourceId) -> anyhow::Result<u64>;

    /// Deletes every membership of a group and returns how many rows went away
    async fn delete_memberships_for_group(&self, group_id: &ResourceId) -> anyhow::Result<u64>;
}
