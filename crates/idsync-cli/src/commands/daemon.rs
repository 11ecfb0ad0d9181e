//! Daemon command - run reconciliation on a fixed interval
//!
//! Runs in the foreground until SIGINT or SIGTERM. A pass in flight when the
//! signal arrives finishes before the process exits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use idsync_core::config::Config;
use idsync_sync::ReconciliationScheduler;

use crate::context::AppContext;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct DaemonCommand {
    /// Seconds between passes (overrides sync.interval_secs)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

impl DaemonCommand {
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let interval = self
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.sync.interval());
        let ctx = AppContext::connect(config).await?;
        let scheduler = ReconciliationScheduler::new(Arc::new(ctx.reconciler()?), interval);

        let shutdown = CancellationToken::new();
        tokio::spawn(shutdown_signal(shutdown.clone()));

        info!(interval_secs = interval.as_secs(), "IdSync daemon starting");
        formatter.info(&format!(
            "Reconciling every {}s, press Ctrl+C to stop",
            interval.as_secs()
        ));

        scheduler.run(shutdown).await;

        info!("IdSync daemon shut down gracefully");
        formatter.success("Daemon stopped");
        Ok(())
    }
}

/// Cancels `token` on SIGINT or SIGTERM
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}
