//! Reconciliation scheduler - runs a pass on a fixed interval
//!
//! ```text
//! interval tick ──→ Reconciler::run_once ──→ summary / logged error
//!       ▲                                          │
//!       └──────────── next tick ◄──────────────────┘
//! ```
//!
//! The first pass starts immediately. A pass that outlasts the interval
//! swallows the ticks it missed instead of bursting to catch up. Errors are
//! logged and the loop keeps going; the next tick starts a fresh pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::reconciler::{Reconciler, RunOutcome};

/// Drives a [`Reconciler`] from a fixed-interval timer
pub struct ReconciliationScheduler {
    reconciler: Arc<Reconciler>,
    interval: Duration,
}

impl ReconciliationScheduler {
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs passes until `cancel` fires
    ///
    /// Cancellation is checked between passes; a pass in flight is allowed
    /// to finish so the guard is always released normally.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Reconciliation scheduler starting"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut passes: u64 = 0;
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!(passes, "Shutdown requested, scheduler stopping");
                    break;
                }

                _ = ticker.tick() => {
                    passes += 1;
                    self.tick(passes).await;
                }
            }
        }

        info!("Reconciliation scheduler stopped");
    }

    async fn tick(&self, pass: u64) {
        debug!(pass, "Scheduled reconciliation tick");
        match self.reconciler.run_once().await {
            Ok(RunOutcome::Completed(summary)) => {
                debug!(pass, writes = summary.total_writes(), "Scheduled pass done");
            }
            Ok(RunOutcome::Skipped) => {
                debug!(pass, "Scheduled pass skipped, another pass is running");
            }
            // Already logged with full context by the reconciler
            Err(e) => {
                debug!(pass, error = %e, "Scheduled pass failed, retrying next tick");
            }
        }
    }
}
