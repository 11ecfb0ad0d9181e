//! ScimDirectoryClient - IDirectoryClient implementation for SCIM 2.0
//!
//! Wraps [`ScimClient`] and [`SchemaMapper`] to fulfil the
//! [`IDirectoryClient`] port contract.
//!
//! ## Design Notes
//!
//! - Listing decodes each resource on its own. A resource that fails to map
//!   (missing id, not an object) is logged and left out; the rest of the
//!   listing is returned.
//! - Create calls only read the assigned `id` from the response; the rest of
//!   the returned representation is discarded.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use idsync_core::domain::{DirectoryGroup, Group, ResourceId, User};
use idsync_core::ports::IDirectoryClient;

use crate::client::ScimClient;
use crate::mapper::SchemaMapper;
use crate::ScimResult;

const USERS: &str = "Users";
const GROUPS: &str = "Groups";

/// SCIM directory adapter
#[derive(Debug, Clone)]
pub struct ScimDirectoryClient {
    client: ScimClient,
}

impl ScimDirectoryClient {
    pub fn new(client: ScimClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ScimClient {
        &self.client
    }
}

/// Keeps the records that decode, logging the ones that do not
fn decode_all<T>(
    collection: &str,
    resources: Vec<serde_json::Value>,
    decode: impl Fn(serde_json::Value) -> ScimResult<T>,
) -> Vec<T> {
    let total = resources.len();
    let decoded: Vec<T> = resources
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match decode(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(collection, index, error = %e, "Skipping unmappable directory record");
                None
            }
        })
        .collect();
    debug!(collection, total, mapped = decoded.len(), "Decoded directory listing");
    decoded
}

#[async_trait::async_trait]
impl IDirectoryClient for ScimDirectoryClient {
    async fn list_users(&self) -> Result<Vec<User>> {
        let resources = self
            .client
            .list_resources(USERS)
            .await
            .context("Failed to list directory users")?;
        Ok(decode_all(USERS, resources, SchemaMapper::decode_user))
    }

    async fn get_user(&self, id: &ResourceId) -> Result<Option<User>> {
        let resource = self
            .client
            .get_resource(USERS, id.as_str())
            .await
            .with_context(|| format!("Failed to fetch directory user {id}"))?;
        resource
            .map(SchemaMapper::decode_user)
            .transpose()
            .map_err(Into::into)
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        let body = SchemaMapper::user_to_wire(user);
        let response = self
            .client
            .create_resource(USERS, &body)
            .await
            .with_context(|| format!("Failed to create directory user {}", user.label()))?;
        let id = SchemaMapper::assigned_id(&response, "user")?;
        debug!(id = %id, "Directory assigned user id");

        let mut created = user.clone();
        created.id = Some(id);
        Ok(created)
    }

    async fn update_user(&self, id: &ResourceId, user: &User) -> Result<()> {
        let body = SchemaMapper::user_to_wire(user);
        self.client
            .replace_resource(USERS, id.as_str(), &body)
            .await
            .with_context(|| format!("Failed to update directory user {id}"))
    }

    async fn delete_user(&self, id: &ResourceId) -> Result<()> {
        self.client
            .delete_resource(USERS, id.as_str())
            .await
            .with_context(|| format!("Failed to delete directory user {id}"))
    }

    async fn list_groups(&self) -> Result<Vec<DirectoryGroup>> {
        let resources = self
            .client
            .list_resources(GROUPS)
            .await
            .context("Failed to list directory groups")?;
        Ok(decode_all(GROUPS, resources, SchemaMapper::decode_group))
    }

    async fn get_group(&self, id: &ResourceId) -> Result<Option<DirectoryGroup>> {
        let resource = self
            .client
            .get_resource(GROUPS, id.as_str())
            .await
            .with_context(|| format!("Failed to fetch directory group {id}"))?;
        resource
            .map(SchemaMapper::decode_group)
            .transpose()
            .map_err(Into::into)
    }

    async fn create_group(&self, group: &Group) -> Result<Group> {
        let body = SchemaMapper::group_to_wire(group, &[]);
        let response = self
            .client
            .create_resource(GROUPS, &body)
            .await
            .with_context(|| format!("Failed to create directory group {}", group.display_name))?;
        let id = SchemaMapper::assigned_id(&response, "group")?;
        debug!(id = %id, "Directory assigned group id");

        let mut created = group.clone();
        created.id = Some(id);
        Ok(created)
    }

    async fn update_group(
        &self,
        id: &ResourceId,
        group: &Group,
        members: &[ResourceId],
    ) -> Result<()> {
        let body = SchemaMapper::group_to_wire(group, members);
        self.client
            .replace_resource(GROUPS, id.as_str(), &body)
            .await
            .with_context(|| format!("Failed to update directory group {id}"))
    }

    async fn delete_group(&self, id: &ResourceId) -> Result<()> {
        self.client
            .delete_resource(GROUPS, id.as_str())
            .await
            .with_context(|| format!("Failed to delete directory group {id}"))
    }

    async fn add_group_member(&self, group_id: &ResourceId, user_id: &ResourceId) -> Result<()> {
        let patch = SchemaMapper::add_member_patch(user_id);
        self.client
            .patch_resource(GROUPS, group_id.as_str(), &patch)
            .await
            .with_context(|| format!("Failed to add member {user_id} to directory group {group_id}"))
    }

    async fn remove_group_member(
        &self,
        group_id: &ResourceId,
        user_id: &ResourceId,
    ) -> Result<()> {
        let patch = SchemaMapper::remove_member_patch(user_id);
        self.client
            .patch_resource(GROUPS, group_id.as_str(), &patch)
            .await
            .with_context(|| {
                format!("Failed to remove member {user_id} from directory group {group_id}")
            })
    }
}
