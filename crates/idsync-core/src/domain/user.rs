//! User entity
//!
//! A [`User`] mirrors a directory user. The identifier is `None` only for a
//! locally created user whose first push to the directory has not completed.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::ResourceId;

/// Two-valued account status, derived from the directory's `active` flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    Inactive,
}

impl UserStatus {
    /// Returns true for [`UserStatus::Active`]
    pub fn is_active(&self) -> bool {
        matches!(self, UserStatus::Active)
    }

    /// Maps the directory's boolean flag to a status
    pub fn from_active(active: bool) -> Self {
        if active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        }
    }

    /// Storage name (`active` / `inactive`)
    pub fn name(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            other => Err(DomainError::InvalidStatus(other.to_string())),
        }
    }
}

/// A directory user as held in the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Directory-assigned identifier (None until the first push succeeds)
    pub id: Option<ResourceId>,
    /// Login name (`userName` on the wire)
    pub login_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Primary email address
    pub email: Option<String>,
    pub status: UserStatus,
    /// Directory user type, `"public"` unless stated otherwise
    pub user_type: String,
    /// Start of the validity window
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window
    pub valid_to: Option<DateTime<Utc>>,
    /// Organization, carried in the enterprise extension
    pub company: Option<String>,
    /// Country of the first address
    pub country: Option<String>,
    /// Locality of the first address
    pub city: Option<String>,
}

impl User {
    /// User type applied when none is given
    pub const DEFAULT_USER_TYPE: &'static str = "public";

    /// Creates an active user without identifier and without optional attributes
    pub fn new(login_name: impl Into<String>) -> Self {
        Self {
            id: None,
            login_name: Some(login_name.into()),
            first_name: None,
            last_name: None,
            email: None,
            status: UserStatus::Active,
            user_type: Self::DEFAULT_USER_TYPE.to_string(),
            valid_from: None,
            valid_to: None,
            company: None,
            country: None,
            city: None,
        }
    }

    /// Sets the identifier (builder style)
    pub fn with_id(mut self, id: ResourceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the email address (builder style)
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets first and last name (builder style)
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Returns the identifier or a [`DomainError::MissingIdentifier`]
    pub fn require_id(&self) -> Result<&ResourceId, DomainError> {
        self.id
            .as_ref()
            .ok_or_else(|| DomainError::MissingIdentifier("user".to_string()))
    }

    /// Name used in logs: login name, then email, then identifier
    pub fn label(&self) -> &str {
        self.login_name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.id.as_ref().map(ResourceId::as_str))
            .unwrap_or("<unnamed>")
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            login_name: None,
            first_name: None,
            last_name: None,
            email: None,
            status: UserStatus::default(),
            user_type: Self::DEFAULT_USER_TYPE.to_string(),
            valid_from: None,
            valid_to: None,
            company: None,
            country: None,
            city: None,
        }
    }
}
