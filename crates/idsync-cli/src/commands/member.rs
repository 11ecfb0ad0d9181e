//! Membership commands
//!
//! Adding or removing a member sends a single-member PATCH to the group in
//! the directory.

use anyhow::{Context, Result};
use clap::Subcommand;

use idsync_core::config::Config;
use idsync_core::domain::{Membership, ResourceId};
use idsync_core::ports::IIdentityStore;

use super::mutation_context;
use crate::context::AppContext;
use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// List memberships in the local store
    List {
        /// Only memberships of this group
        #[arg(long)]
        group: Option<ResourceId>,
        /// Only memberships of this user
        #[arg(long)]
        user: Option<ResourceId>,
    },
    /// Add a user to a group
    Add {
        group: ResourceId,
        user: ResourceId,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
    /// Remove a user from a group
    Remove {
        group: ResourceId,
        user: ResourceId,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
}

fn matches_filter(
    membership: &Membership,
    group: Option<&ResourceId>,
    user: Option<&ResourceId>,
) -> bool {
    group.map_or(true, |g| &membership.group_id == g)
        && user.map_or(true, |u| &membership.user_id == u)
}

impl MemberCommand {
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        match self {
            MemberCommand::List { group, user } => {
                let ctx = AppContext::open_local(config).await?;
                let memberships: Vec<Membership> = ctx
                    .reader()
                    .list_memberships()
                    .await?
                    .into_iter()
                    .filter(|m| matches_filter(m, group.as_ref(), user.as_ref()))
                    .collect();

                if format.is_json() {
                    formatter.print_json(&serde_json::to_value(&memberships)?);
                    return Ok(());
                }
                formatter.success(&plural(memberships.len() as u64, "membership"));
                for membership in &memberships {
                    formatter.info(&format!(
                        "{:<24} {}",
                        membership.group_id, membership.user_id
                    ));
                }
            }

            MemberCommand::Add {
                group,
                user,
                local_only,
            } => {
                let membership = Membership::new(group.clone(), user.clone());
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                store
                    .insert_membership(&membership)
                    .await
                    .with_context(|| format!("Failed to add membership {membership}"))?;
                formatter.success(&format!("Added {user} to {group}"));
                formatter.print_json(&serde_json::json!({
                    "action": "add",
                    "group_id": group,
                    "user_id": user,
                }));
            }

            MemberCommand::Remove {
                group,
                user,
                local_only,
            } => {
                let membership = Membership::new(group.clone(), user.clone());
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                store
                    .delete_membership(&membership)
                    .await
                    .with_context(|| format!("Failed to remove membership {membership}"))?;
                formatter.success(&format!("Removed {user} from {group}"));
                formatter.print_json(&serde_json::json!({
                    "action": "remove",
                    "group_id": group,
                    "user_id": user,
                }));
            }
        }

        Ok(())
    }
}
