//! SyncGuard - coordination between the pull and push directions
//!
//! Holds the only state shared by the reconciler and the change propagator:
//!
//! - `running`: at most one reconciliation pass at a time
//! - `suppressed`: push propagation is off while a pass writes locally
//!
//! A pass starts with [`SyncGuard::try_begin_reconciliation`], which hands out
//! a [`ReconciliationPermit`]. Dropping the permit (or calling
//! [`ReconciliationPermit::end`]) clears both flags, so every exit path of a
//! pass releases them, including early returns through `?`.
//!
//! The flags are independent atomics. A local mutation that checks
//! suppression just before a pass sets it can still push while the pass
//! reads its snapshot; that window is accepted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Process-wide re-entrancy lock and suppression flag
#[derive(Debug, Default)]
pub struct SyncGuard {
    running: AtomicBool,
    suppressed: AtomicBool,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the re-entrancy lock and suppresses pushes
    ///
    /// Returns `None` without touching either flag if a pass already holds
    /// the lock.
    pub fn try_begin_reconciliation(self: &Arc<Self>) -> Option<ReconciliationPermit> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        self.suppressed.store(true, Ordering::Release);
        debug!("Reconciliation lock acquired, push propagation suppressed");

        Some(ReconciliationPermit {
            guard: Arc::clone(self),
        })
    }

    /// Whether local mutations must not be pushed right now
    pub fn is_push_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::Acquire)
    }

    /// Whether a reconciliation pass holds the lock
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof that the holder owns the current reconciliation pass
#[must_use = "dropping the permit ends the reconciliation immediately"]
#[derive(Debug)]
pub struct ReconciliationPermit {
    guard: Arc<SyncGuard>,
}

impl ReconciliationPermit {
    /// Ends the pass, re-enabling pushes and releasing the lock
    pub fn end(self) {}
}

impl Drop for ReconciliationPermit {
    fn drop(&mut self) {
        // Pushes come back on before another pass may start
        self.guard.suppressed.store(false, Ordering::Release);
        self.guard.running.store(false, Ordering::Release);
        debug!("Reconciliation lock released, push propagation enabled");
    }
}
