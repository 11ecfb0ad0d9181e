//! SQLite implementation of IIdentityStore
//!
//! ## Type Mapping
//!
//! | Domain Type     | SQL Type | Strategy                                   |
//! |-----------------|----------|--------------------------------------------|
//! | ResourceId      | TEXT     | `.as_str()` / `ResourceId::new()`          |
//! | UserStatus      | TEXT     | `"active"` / `"inactive"`                  |
//! | DateTime<Utc>   | TEXT     | RFC 3339 with `Z` and sub-second precision |
//! | Membership      | 2 x TEXT | composite primary key `(group_id, user_id)` |

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use idsync_core::domain::{Group, Membership, ResourceId, User, UserStatus};
use idsync_core::ports::IIdentityStore;

use crate::StoreError;

/// SQLite-backed identity store
#[derive(Debug, Clone)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
}

impl SqliteIdentityStore {
    /// Creates a new store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Helper functions for type conversion
// ============================================================================

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_optional_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    match s {
        Some(ref val) if !val.is_empty() => DateTime::parse_from_rfc3339(val)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| {
                StoreError::SerializationError(format!("Failed to parse datetime '{}': {}", val, e))
            }),
        _ => Ok(None),
    }
}

fn parse_id(raw: String) -> Result<ResourceId, StoreError> {
    ResourceId::new(raw).map_err(|e| StoreError::SerializationError(e.to_string()))
}

// ============================================================================
// Row mapping functions
// ============================================================================

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    let status: String = row.get("status");
    Ok(User {
        id: Some(parse_id(row.get("id"))?),
        login_name: row.get("login_name"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        status: status
            .parse::<UserStatus>()
            .map_err(|e| StoreError::SerializationError(e.to_string()))?,
        user_type: row.get("user_type"),
        valid_from: parse_optional_datetime(row.get("valid_from"))?,
        valid_to: parse_optional_datetime(row.get("valid_to"))?,
        company: row.get("company"),
        country: row.get("country"),
        city: row.get("city"),
    })
}

fn group_from_row(row: &SqliteRow) -> Result<Group, StoreError> {
    Ok(Group {
        id: Some(parse_id(row.get("id"))?),
        display_name: row.get("display_name"),
        name: row.get("name"),
        description: row.get("description"),
    })
}

fn membership_from_row(row: &SqliteRow) -> Result<Membership, StoreError> {
    Ok(Membership::new(
        parse_id(row.get("group_id"))?,
        parse_id(row.get("user_id"))?,
    ))
}

const USER_COLUMNS: &str = "id, login_name, first_name, last_name, email, status, user_type, \
                            valid_from, valid_to, company, country, city";

// ============================================================================
// IIdentityStore implementation
// ============================================================================

#[async_trait::async_trait]
impl IIdentityStore for SqliteIdentityStore {
    // --- Users ---

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM directory_users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn get_user(&self, id: &ResourceId) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM directory_users WHERE id = ?"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<ResourceId> {
        let id = user.id.clone().ok_or(StoreError::MissingIdentifier("user"))?;

        sqlx::query(&format!(
            "INSERT INTO directory_users ({USER_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(id.as_str())
        .bind(&user.login_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.status.name())
        .bind(&user.user_type)
        .bind(user.valid_from.as_ref().map(format_datetime))
        .bind(user.valid_to.as_ref().map(format_datetime))
        .bind(&user.company)
        .bind(&user.country)
        .bind(&user.city)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(id = %id, "Inserted user");
        Ok(id)
    }

    async fn update_user(&self, id: &ResourceId, user: &User) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE directory_users SET \
             login_name = ?, first_name = ?, last_name = ?, email = ?, status = ?, \
             user_type = ?, valid_from = ?, valid_to = ?, company = ?, country = ?, city = ? \
             WHERE id = ?",
        )
        .bind(&user.login_name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.status.name())
        .bind(&user.user_type)
        .bind(user.valid_from.as_ref().map(format_datetime))
        .bind(user.valid_to.as_ref().map(format_datetime))
        .bind(&user.company)
        .bind(&user.country)
        .bind(&user.city)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                key: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn delete_user(&self, id: &ResourceId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM directory_users WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    // --- Groups ---

    async fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        let rows = sqlx::query(
            "SELECT id, display_name, name, description FROM directory_groups ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        rows.iter()
            .map(|row| group_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn get_group(&self, id: &ResourceId) -> anyhow::Result<Option<Group>> {
        let row = sqlx::query(
            "SELECT id, display_name, name, description FROM directory_groups WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(row.as_ref().map(group_from_row).transpose()?)
    }

    async fn insert_group(&self, group: &Group) -> anyhow::Result<ResourceId> {
        let id = group
            .id
            .clone()
            .ok_or(StoreError::MissingIdentifier("group"))?;

        sqlx::query(
            "INSERT INTO directory_groups (id, display_name, name, description) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&group.display_name)
        .bind(&group.name)
        .bind(&group.description)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(id = %id, "Inserted group");
        Ok(id)
    }

    async fn update_group(&self, id: &ResourceId, group: &Group) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE directory_groups SET display_name = ?, name = ?, description = ? \
             WHERE id = ?",
        )
        .bind(&group.display_name)
        .bind(&group.name)
        .bind(&group.description)
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "group",
                key: id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn delete_group(&self, id: &ResourceId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM directory_groups WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    // --- Memberships ---

    async fn list_memberships(&self) -> anyhow::Result<Vec<Membership>> {
        let rows =
            sqlx::query("SELECT group_id, user_id FROM group_memberships ORDER BY group_id, user_id")
                .fetch_all(&self.pool)
                .await
                .map_err(StoreError::from)?;

        rows.iter()
            .map(|row| membership_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn insert_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO group_memberships (group_id, user_id) VALUES (?, ?)")
            .bind(membership.group_id.as_str())
            .bind(membership.user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete_membership(&self, membership: &Membership) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM group_memberships WHERE group_id = ? AND user_id = ?")
            .bind(membership.group_id.as_str())
            .bind(membership.user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete_memberships_for_user(&self, user_id: &ResourceId) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM group_memberships WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(result.rows_affected())
    }

    async fn delete_memberships_for_group(&self, group_id: &ResourceId) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM group_memberships WHERE group_id = ?")
            .bind(group_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(result.rows_affected())
    }
}
