//! Schema mapping between domain entities and SCIM wire records
//!
//! [`SchemaMapper`] is stateless. Inbound, every optional attribute maps to
//! unset when absent or malformed; only a missing or unusable `id` rejects
//! a record. Outbound, unset and empty values are omitted and an extension
//! URI is listed only when its object is actually emitted.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;

use idsync_core::domain::{DirectoryGroup, Group, ResourceId, User, UserStatus};

use crate::schema::{
    EnterpriseExtension, GroupCustomExtension, GroupExtensions, PatchOpKind, ScimAddress,
    ScimEmail, ScimGroup, ScimMember, ScimName, ScimPatchOperation, ScimPatchRequest, ScimUser,
    UserExtensions, ValidityExtension, ENTERPRISE_USER_EXTENSION, GROUP_CUSTOM_EXTENSION,
    GROUP_SCHEMA, SAP_USER_EXTENSION, USER_SCHEMA,
};
use crate::{ScimError, ScimResult};

/// Address type emitted on outbound users
const HOME_ADDRESS: &str = "home";

/// Stateless translator between domain entities and SCIM records
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMapper;

impl SchemaMapper {
    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Decodes a raw JSON resource into a [`User`]
    pub fn decode_user(value: serde_json::Value) -> ScimResult<User> {
        let wire: ScimUser = serde_json::from_value(value)
            .map_err(|e| ScimError::Mapping(format!("user resource is not an object: {e}")))?;
        Self::user_from_wire(&wire)
    }

    /// Maps a wire user to the domain record
    pub fn user_from_wire(wire: &ScimUser) -> ScimResult<User> {
        let id = required_id(wire.id.as_deref(), "user")?;

        let (first_name, last_name) = match &wire.name {
            Some(name) => (non_empty(&name.given_name), non_empty(&name.family_name)),
            None => (None, None),
        };

        let email = wire.emails.first().and_then(|e| non_empty(&e.value));

        let (valid_from, valid_to) = match &wire.extensions.validity {
            Some(ext) => (
                parse_timestamp(ext.valid_from.as_deref()),
                parse_timestamp(ext.valid_to.as_deref()),
            ),
            None => (None, None),
        };

        let company = wire
            .extensions
            .enterprise
            .as_ref()
            .and_then(|ext| non_empty(&ext.organization));

        let (country, city) = match wire.addresses.first() {
            Some(addr) => (non_empty(&addr.country), non_empty(&addr.locality)),
            None => (None, None),
        };

        Ok(User {
            id: Some(id),
            login_name: non_empty(&wire.user_name),
            first_name,
            last_name,
            email,
            status: UserStatus::from_active(wire.active.unwrap_or(false)),
            user_type: non_empty(&wire.user_type)
                .unwrap_or_else(|| User::DEFAULT_USER_TYPE.to_string()),
            valid_from,
            valid_to,
            company,
            country,
            city,
        })
    }

    /// Builds the wire body for creating or replacing a user
    pub fn user_to_wire(user: &User) -> ScimUser {
        let mut schemas = vec![USER_SCHEMA.to_string()];

        let validity = if user.valid_from.is_some() || user.valid_to.is_some() {
            schemas.push(SAP_USER_EXTENSION.to_string());
            Some(ValidityExtension {
                valid_from: user.valid_from.map(format_timestamp),
                valid_to: user.valid_to.map(format_timestamp),
            })
        } else {
            None
        };

        let enterprise = non_empty(&user.company).map(|company| {
            schemas.push(ENTERPRISE_USER_EXTENSION.to_string());
            EnterpriseExtension {
                organization: Some(company),
            }
        });

        let first_name = non_empty(&user.first_name);
        let last_name = non_empty(&user.last_name);
        let name = (first_name.is_some() || last_name.is_some()).then(|| ScimName {
            given_name: first_name,
            family_name: last_name,
        });

        let email = non_empty(&user.email);
        let emails = email
            .clone()
            .map(|value| ScimEmail {
                value: Some(value),
                primary: Some(true),
            })
            .into_iter()
            .collect();

        let country = non_empty(&user.country);
        let city = non_empty(&user.city);
        let addresses = if country.is_some() || city.is_some() {
            vec![ScimAddress {
                kind: Some(HOME_ADDRESS.to_string()),
                primary: Some(false),
                country,
                locality: city,
            }]
        } else {
            Vec::new()
        };

        let user_type = if user.user_type.trim().is_empty() {
            User::DEFAULT_USER_TYPE.to_string()
        } else {
            user.user_type.clone()
        };

        ScimUser {
            schemas,
            id: user.id.as_ref().map(|id| id.to_string()),
            user_name: non_empty(&user.login_name).or(email),
            name,
            emails,
            active: Some(user.status.is_active()),
            user_type: Some(user_type),
            addresses,
            extensions: UserExtensions {
                validity,
                enterprise,
            },
        }
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Decodes a raw JSON resource into a group with its members
    pub fn decode_group(value: serde_json::Value) -> ScimResult<DirectoryGroup> {
        let wire: ScimGroup = serde_json::from_value(value)
            .map_err(|e| ScimError::Mapping(format!("group resource is not an object: {e}")))?;
        Self::group_from_wire(&wire)
    }

    /// Maps a wire group to the domain record plus its member identifiers
    ///
    /// Member entries without a usable `value` are dropped individually.
    pub fn group_from_wire(wire: &ScimGroup) -> ScimResult<DirectoryGroup> {
        let id = required_id(wire.id.as_deref(), "group")?;

        let (name, description) = match &wire.extensions.custom {
            Some(ext) => (non_empty(&ext.name), non_empty(&ext.description)),
            None => (None, None),
        };

        let mut members = Vec::with_capacity(wire.members.len());
        for member in &wire.members {
            match member.value.as_deref().map(ResourceId::new) {
                Some(Ok(user_id)) => members.push(user_id),
                Some(Err(e)) => warn!(group = %id, error = %e, "Skipping group member with invalid value"),
                None => warn!(group = %id, "Skipping group member without value"),
            }
        }

        Ok(DirectoryGroup {
            group: Group {
                id: Some(id),
                display_name: wire.display_name.clone().unwrap_or_default(),
                name,
                description,
            },
            members,
        })
    }

    /// Builds the wire body for creating or replacing a group
    ///
    /// `members` is emitted as the group's member list; pass an empty slice
    /// on create.
    pub fn group_to_wire(group: &Group, members: &[ResourceId]) -> ScimGroup {
        let mut schemas = vec![GROUP_SCHEMA.to_string()];

        let name = non_empty(&group.name);
        let description = non_empty(&group.description);
        let custom = (name.is_some() || description.is_some()).then(|| {
            schemas.push(GROUP_CUSTOM_EXTENSION.to_string());
            GroupCustomExtension { name, description }
        });

        ScimGroup {
            schemas,
            id: group.id.as_ref().map(|id| id.to_string()),
            display_name: Some(group.display_name.clone()),
            members: members
                .iter()
                .map(|id| ScimMember::reference(id.as_str()))
                .collect(),
            extensions: GroupExtensions { custom },
        }
    }

    // ------------------------------------------------------------------
    // Membership patches
    // ------------------------------------------------------------------

    /// Patch adding a single member to a group
    pub fn add_member_patch(user_id: &ResourceId) -> ScimPatchRequest {
        ScimPatchRequest::new(vec![ScimPatchOperation {
            op: PatchOpKind::Add,
            path: Some("members".to_string()),
            value: Some(vec![ScimMember::reference(user_id.as_str())]),
        }])
    }

    /// Patch removing a single member from a group
    pub fn remove_member_patch(user_id: &ResourceId) -> ScimPatchRequest {
        ScimPatchRequest::new(vec![ScimPatchOperation {
            op: PatchOpKind::Remove,
            path: Some(format!(
                "members[value eq \"{}\"]",
                escape_filter_value(user_id.as_str())
            )),
            value: None,
        }])
    }

    /// Reads the identifier the directory assigned in a create response
    pub fn assigned_id(response: &serde_json::Value, entity: &str) -> ScimResult<ResourceId> {
        required_id(response.get("id").and_then(|v| v.as_str()), entity)
    }
}

fn required_id(id: Option<&str>, entity: &str) -> ScimResult<ResourceId> {
    let raw = id.ok_or_else(|| ScimError::Mapping(format!("{entity} resource has no id")))?;
    ResourceId::new(raw).map_err(|e| ScimError::Mapping(format!("{entity} resource id: {e}")))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            warn!(value = raw, error = %e, "Ignoring unparseable timestamp");
            None
        }
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Escapes a value embedded in a quoted filter literal
fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
