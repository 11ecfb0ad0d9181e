//! Group entity

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::ResourceId;

/// A directory group as held in the local store
///
/// `name` and `description` travel in a custom extension namespace on the
/// wire, not in the core group schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Directory-assigned identifier (None until the first push succeeds)
    pub id: Option<ResourceId>,
    pub display_name: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Group {
    /// Creates a group without identifier
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
            name: None,
            description: None,
        }
    }

    /// Sets the identifier (builder style)
    pub fn with_id(mut self, id: ResourceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the description (builder style)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the identifier or a [`DomainError::MissingIdentifier`]
    pub fn require_id(&self) -> Result<&ResourceId, DomainError> {
        self.id
            .as_ref()
            .ok_or_else(|| DomainError::MissingIdentifier("group".to_string()))
    }
}

/// A group as listed by the remote directory, together with its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub group: Group,
    /// User identifiers listed under `members`
    pub members: Vec<ResourceId>,
}
