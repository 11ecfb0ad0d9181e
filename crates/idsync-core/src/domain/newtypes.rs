//! Identifier newtypes
//!
//! [`ResourceId`] is the identifier the remote directory assigns to a User or
//! Group. It is never generated locally, so validation only rejects values that
//! cannot serve as a key at all.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

/// Identifier of a User or Group, assigned by the remote directory
///
/// The same value is the primary key in the local store. Any characters are
/// accepted (including `:`), since identifiers are compared as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new ResourceId
    ///
    /// # Errors
    /// Returns error if the ID is empty or only whitespace
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidResourceId(
                "Resource ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(char::is_control) {
            return Err(DomainError::InvalidResourceId(format!(
                "Resource ID contains control characters: {id:?}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResourceId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

/// The three entity types that are synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Group,
    Membership,
}

impl EntityKind {
    /// Lowercase name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Group => "group",
            EntityKind::Membership => "membership",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_valid() {
        let id = ResourceId::new("b6a1c2d4-0001").unwrap();
        assert_eq!(id.as_str(), "b6a1c2d4-0001");
        assert_eq!(id.to_string(), "b6a1c2d4-0001");
    }

    #[test]
    fn test_resource_id_accepts_separator_characters() {
        let id = ResourceId::new("tenant:42").unwrap();
        assert_eq!(id.as_str(), "tenant:42");
    }

    #[test]
    fn test_resource_id_rejects_empty() {
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("   ").is_err());
    }

    #[test]
    fn test_resource_id_rejects_control_chars() {
        assert!(ResourceId::new("abc\n").is_err());
    }

    #[test]
    fn test_resource_id_from_str_and_string() {
        let id: ResourceId = "u-1".parse().unwrap();
        let s: String = id.clone().into();
        assert_eq!(s, "u-1");
        assert_eq!(ResourceId::try_from("u-1".to_string()).unwrap(), id);
    }

    #[test]
    fn test_resource_id_serde_is_transparent() {
        let id = ResourceId::new("g-7").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"g-7\"");

        let back: ResourceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<ResourceId>("\"\"").is_err());
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::User.to_string(), "user");
        assert_eq!(EntityKind::Group.name(), "group");
        assert_eq!(EntityKind::Membership.name(), "membership");
    }
}
