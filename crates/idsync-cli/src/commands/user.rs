//! User commands
//!
//! Mutations go through the hooked store, so each one is pushed to the
//! directory before the local write commits. `--local-only` skips the push.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use idsync_core::config::Config;
use idsync_core::domain::{ResourceId, User, UserStatus};
use idsync_core::ports::IIdentityStore;

use super::mutation_context;
use crate::context::AppContext;
use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users in the local store
    List,
    /// Show one user
    Show {
        /// Directory-assigned user id
        id: ResourceId,
    },
    /// Create a user; the directory assigns its id
    Create {
        /// Use an existing directory id instead of creating remotely
        #[arg(long)]
        id: Option<ResourceId>,
        #[command(flatten)]
        fields: UserFields,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
    /// Change fields of an existing user
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: UserFields,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
    /// Delete a user and its memberships
    Delete {
        id: ResourceId,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
}

/// User attributes settable from the command line
#[derive(Debug, Default, Args)]
pub struct UserFields {
    #[arg(long)]
    pub login: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// active or inactive
    #[arg(long)]
    pub status: Option<UserStatus>,
    #[arg(long)]
    pub user_type: Option<String>,
    /// Start of the validity window (RFC 3339)
    #[arg(long)]
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window (RFC 3339)
    #[arg(long)]
    pub valid_to: Option<DateTime<Utc>>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
}

impl UserFields {
    /// Overwrites the fields that were given
    fn apply(&self, user: &mut User) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *target = Some(value.clone());
            }
        }

        set(&mut user.login_name, &self.login);
        set(&mut user.email, &self.email);
        set(&mut user.first_name, &self.first_name);
        set(&mut user.last_name, &self.last_name);
        set(&mut user.company, &self.company);
        set(&mut user.country, &self.country);
        set(&mut user.city, &self.city);
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(user_type) = &self.user_type {
            user.user_type = user_type.clone();
        }
        if self.valid_from.is_some() {
            user.valid_from = self.valid_from;
        }
        if self.valid_to.is_some() {
            user.valid_to = self.valid_to;
        }
    }

    fn is_empty(&self) -> bool {
        [
            &self.login,
            &self.email,
            &self.first_name,
            &self.last_name,
            &self.user_type,
            &self.company,
            &self.country,
            &self.city,
        ]
        .iter()
        .all(|field| field.is_none())
            && self.status.is_none()
            && self.valid_from.is_none()
            && self.valid_to.is_none()
    }
}

/// Builds a new user record: active unless told otherwise
fn new_user(id: Option<ResourceId>, fields: &UserFields) -> Result<User> {
    if fields.login.is_none() && fields.email.is_none() {
        bail!("A new user needs --login or --email");
    }
    let mut user = User {
        id,
        status: UserStatus::Active,
        ..User::default()
    };
    fields.apply(&mut user);
    Ok(user)
}

fn summary_line(user: &User) -> String {
    format!(
        "{:<24} {:<24} {:<32} {}",
        user.id.as_ref().map(ResourceId::as_str).unwrap_or("-"),
        user.login_name.as_deref().unwrap_or("-"),
        user.email.as_deref().unwrap_or("-"),
        user.status,
    )
}

impl UserCommand {
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        match self {
            UserCommand::List => {
                let ctx = AppContext::open_local(config).await?;
                let users = ctx.reader().list_users().await?;
                if format.is_json() {
                    formatter.print_json(&serde_json::to_value(&users)?);
                    return Ok(());
                }
                formatter.success(&plural(users.len() as u64, "user"));
                for user in &users {
                    formatter.info(&summary_line(user));
                }
            }

            UserCommand::Show { id } => {
                let ctx = AppContext::open_local(config).await?;
                let Some(user) = ctx.reader().get_user(id).await? else {
                    bail!("User {id} not found");
                };
                if format.is_json() {
                    formatter.print_json(&serde_json::to_value(&user)?);
                    return Ok(());
                }
                formatter.success(&format!("User {id}"));
                for line in serde_yaml::to_string(&user)?.lines() {
                    formatter.info(line);
                }
            }

            UserCommand::Create {
                id,
                fields,
                local_only,
            } => {
                let user = new_user(id.clone(), fields)?;
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                let key = store
                    .insert_user(&user)
                    .await
                    .with_context(|| format!("Failed to create user {}", user.label()))?;
                formatter.success(&format!("Created user {key}"));
                formatter.print_json(&serde_json::json!({"action": "create", "id": key}));
            }

            UserCommand::Update {
                id,
                fields,
                local_only,
            } => {
                if fields.is_empty() {
                    bail!("Nothing to update; pass at least one field");
                }
                let (ctx, store) = mutation_context(config, *local_only).await?;
                let Some(mut user) = ctx.reader().get_user(id).await? else {
                    bail!("User {id} not found");
                };
                fields.apply(&mut user);
                store
                    .update_user(id, &user)
                    .await
                    .with_context(|| format!("Failed to update user {id}"))?;
                formatter.success(&format!("Updated user {id}"));
                formatter.print_json(&serde_json::json!({"action": "update", "id": id}));
            }

            UserCommand::Delete { id, local_only } => {
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                store
                    .delete_user(id)
                    .await
                    .with_context(|| format!("Failed to delete user {id}"))?;
                formatter.success(&format!("Deleted user {id}"));
                formatter.print_json(&serde_json::json!({"action": "delete", "id": id}));
            }
        }

        Ok(())
    }
}
