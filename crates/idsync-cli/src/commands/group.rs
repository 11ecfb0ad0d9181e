//! Group commands

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use idsync_core::config::Config;
use idsync_core::domain::{Group, ResourceId};
use idsync_core::ports::IIdentityStore;

use super::mutation_context;
use crate::context::AppContext;
use crate::output::{get_formatter, plural, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum GroupCommand {
    /// List groups in the local store
    List,
    /// Show one group with its members
    Show { id: ResourceId },
    /// Create a group; the directory assigns its id
    Create {
        display_name: String,
        /// Free-text name carried in the custom extension
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Use an existing directory id instead of creating remotely
        #[arg(long)]
        id: Option<ResourceId>,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
    /// Change fields of an existing group
    Update {
        id: ResourceId,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
    /// Delete a group and its memberships
    Delete {
        id: ResourceId,
        /// Write to the local store only
        #[arg(long)]
        local_only: bool,
    },
}

/// Members of `group_id` according to the local store
async fn local_members(store: &dyn IIdentityStore, group_id: &ResourceId) -> Result<Vec<ResourceId>> {
    Ok(store
        .list_memberships()
        .await?
        .into_iter()
        .filter(|m| &m.group_id == group_id)
        .map(|m| m.user_id)
        .collect())
}

impl GroupCommand {
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        match self {
            GroupCommand::List => {
                let ctx = AppContext::open_local(config).await?;
                let groups = ctx.reader().list_groups().await?;
                if format.is_json() {
                    formatter.print_json(&serde_json::to_value(&groups)?);
                    return Ok(());
                }
                formatter.success(&plural(groups.len() as u64, "group"));
                for group in &groups {
                    formatter.info(&format!(
                        "{:<24} {}",
                        group.id.as_ref().map(ResourceId::as_str).unwrap_or("-"),
                        group.display_name
                    ));
                }
            }

            GroupCommand::Show { id } => {
                let ctx = AppContext::open_local(config).await?;
                let reader = ctx.reader();
                let Some(group) = reader.get_group(id).await? else {
                    bail!("Group {id} not found");
                };
                let members = local_members(reader.as_ref(), id).await?;

                if format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "group": group,
                        "members": members,
                    }));
                    return Ok(());
                }
                formatter.success(&format!("Group {id}: {}", group.display_name));
                if let Some(name) = &group.name {
                    formatter.info(&format!("Name:        {name}"));
                }
                if let Some(description) = &group.description {
                    formatter.info(&format!("Description: {description}"));
                }
                formatter.info(&format!("Members:     {}", plural(members.len() as u64, "user")));
                for member in &members {
                    formatter.info(&format!("  {member}"));
                }
            }

            GroupCommand::Create {
                display_name,
                name,
                description,
                id,
                local_only,
            } => {
                let group = Group {
                    id: id.clone(),
                    display_name: display_name.clone(),
                    name: name.clone(),
                    description: description.clone(),
                };
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                let key = store
                    .insert_group(&group)
                    .await
                    .with_context(|| format!("Failed to create group {display_name}"))?;
                formatter.success(&format!("Created group {key}"));
                formatter.print_json(&serde_json::json!({"action": "create", "id": key}));
            }

            GroupCommand::Update {
                id,
                display_name,
                name,
                description,
                local_only,
            } => {
                if display_name.is_none() && name.is_none() && description.is_none() {
                    bail!("Nothing to update; pass at least one field");
                }
                let (ctx, store) = mutation_context(config, *local_only).await?;
                let Some(mut group) = ctx.reader().get_group(id).await? else {
                    bail!("Group {id} not found");
                };
                if let Some(display_name) = display_name {
                    group.display_name = display_name.clone();
                }
                if name.is_some() {
                    group.name = name.clone();
                }
                if description.is_some() {
                    group.description = description.clone();
                }
                store
                    .update_group(id, &group)
                    .await
                    .with_context(|| format!("Failed to update group {id}"))?;
                formatter.success(&format!("Updated group {id}"));
                formatter.print_json(&serde_json::json!({"action": "update", "id": id}));
            }

            GroupCommand::Delete { id, local_only } => {
                let (_ctx, store) = mutation_context(config, *local_only).await?;
                store
                    .delete_group(id)
                    .await
                    .with_context(|| format!("Failed to delete group {id}"))?;
                formatter.success(&format!("Deleted group {id}"));
                formatter.print_json(&serde_json::json!({"action": "delete", "id": id}));
            }
        }

        Ok(())
    }
}
