//! Aggregate counters for one reconciliation run.

use serde::Serialize;

use crate::reconcile::SyncOutcome;

/// Counters incremented once per processed entity.
///
/// Every entity lands in exactly one of `synced`, `skipped` or `errors`, so
/// `checked == synced + skipped + errors` holds after any run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub checked: u64,
    pub synced: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl RunStatistics {
    /// Count one entity's terminal outcome.
    pub fn record(&mut self, outcome: &SyncOutcome) {
        self.checked += 1;
        match outcome {
            SyncOutcome::Skipped(_) => self.skipped += 1,
            SyncOutcome::Synced { .. } => self.synced += 1,
            SyncOutcome::Error(_) => self.errors += 1,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.checked == self.synced + self.skipped + self.errors
    }
}
