//! Directory client port (driven/secondary port)
//!
//! The narrow surface of the remote identity directory consumed by the
//! sync engine: CRUD for users and groups plus single-member patches.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result`; adapters wrap their own error type (transport,
//!   status, mapping) and callers treat every failure the same way.
//! - Listing operations return already-mapped domain records. A remote
//!   record that cannot be mapped is left out by the adapter and logged,
//!   it never fails the whole listing.

use crate::domain::{DirectoryGroup, Group, ResourceId, User};

/// Port trait for the remote identity directory
#[async_trait::async_trait]
pub trait IDirectoryClient: Send + Sync {
    // --- Users ---

    /// Returns every user in the directory
    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    /// Fetches a single user, `None` when the directory answers 404
    async fn get_user(&self, id: &ResourceId) -> anyhow::Result<Option<User>>;

    /// Creates a user and returns it with the directory-assigned identifier
    async fn create_user(&self, user: &User) -> anyhow::Result<User>;

    /// Replaces the user stored under `id`
    async fn update_user(&self, id: &ResourceId, user: &User) -> anyhow::Result<()>;

    async fn delete_user(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Groups ---

    /// Returns every group in the directory together with its member list
    async fn list_groups(&self) -> anyhow::Result<Vec<DirectoryGroup>>;

    /// Fetches a single group with its members, `None` when not found
    async fn get_group(&self, id: &ResourceId) -> anyhow::Result<Option<DirectoryGroup>>;

    /// Creates a group and returns it with the directory-assigned identifier
    async fn create_group(&self, group: &Group) -> anyhow::Result<Group>;

    /// Replaces the group stored under `id`
    ///
    /// `members` is sent along with the replacement body so that a full
    /// replace does not drop the existing member list.
    async fn update_group(
        &self,
        id: &ResourceId,
        group: &Group,
        members: &[ResourceId],
    ) -> anyhow::Result<()>;

    async fn delete_group(&self, id: &ResourceId) -> anyhow::Result<()>;

    // --- Membership patches ---

    /// Adds a single member to a group
    async fn add_group_member(&self, group_id: &ResourceId, user_id: &ResourceId)
        -> anyhow::Result<()>;

    /// Removes a single member from a group
    async fn remove_group_member(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> anyhow::Result<()>;
}
