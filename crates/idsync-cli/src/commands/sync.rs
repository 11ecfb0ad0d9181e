//! Sync command - run one reconciliation pass
//!
//! Pulls Users, Groups and Memberships from the directory, applies the
//! differences to the local store and prints what changed.

use anyhow::Result;
use clap::Args;

use idsync_core::config::Config;
use idsync_sync::{EntityStats, ReconcileSummary, RunOutcome};

use crate::context::AppContext;
use crate::output::{duration_display, get_formatter, plural, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Skip updates for records that are already identical locally
    #[arg(long)]
    pub skip_unchanged: bool,
}

impl SyncCommand {
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let ctx = AppContext::connect(config).await?;

        let mut reconciler = ctx.reconciler()?;
        if self.skip_unchanged {
            reconciler = reconciler.with_skip_unchanged(true);
        }

        formatter.info("Reconciling with directory...");
        match reconciler.run_once().await? {
            RunOutcome::Completed(summary) => print_summary(formatter.as_ref(), format, &summary),
            RunOutcome::Skipped => formatter.warn("Another reconciliation pass is running"),
        }
        Ok(())
    }
}

fn stats_line(label: &str, noun: &str, stats: &EntityStats) -> Option<String> {
    if stats.writes() == 0 && stats.unchanged == 0 {
        return None;
    }
    Some(format!(
        "{label:<12} +{} ~{} -{} ({} unchanged)",
        stats.created,
        stats.updated,
        stats.deleted,
        plural(stats.unchanged, noun),
    ))
}

fn print_summary(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    summary: &ReconcileSummary,
) {
    if format.is_json() {
        formatter.print_json(&serde_json::to_value(summary).unwrap_or_default());
        return;
    }

    let duration = duration_display(summary.duration_ms);
    if summary.total_writes() == 0 {
        formatter.success(&format!("Already up to date ({duration})"));
    } else {
        formatter.success(&format!(
            "Reconciled {} in {duration}",
            plural(summary.total_writes(), "local write")
        ));
    }

    let lines = [
        stats_line("Users:", "user", &summary.users),
        stats_line("Groups:", "group", &summary.groups),
        stats_line("Memberships:", "membership", &summary.memberships),
    ];
    for line in lines.into_iter().flatten() {
        formatter.info(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_line() {
        let stats = EntityStats {
            created: 1,
            updated: 2,
            deleted: 0,
            unchanged: 1,
        };
        assert_eq!(
            stats_line("Users:", "user", &stats).unwrap(),
            "Users:       +1 ~2 -0 (1 user unchanged)"
        );
        assert!(stats_line("Groups:", "group", &EntityStats::default()).is_none());
    }

    #[test]
    fn test_summary_serializes_counts() {
        let summary = ReconcileSummary {
            users: EntityStats {
                created: 3,
                ..Default::default()
            },
            duration_ms: 42,
            ..Default::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["users"]["created"], 3);
        assert_eq!(value["groups"]["deleted"], 0);
        assert_eq!(value["duration_ms"], 42);
    }
}
