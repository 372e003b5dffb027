use crate::reconcile::ReconcileOutcome;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters accumulated across one run
///
/// Shared by all workers; every update is a single atomic increment.
#[derive(Debug, Default)]
pub struct RunStats {
    created: AtomicU64,
    updated: AtomicU64,
    skipped: AtomicU64,
    failed_listings: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the outcome of one reconciliation
    pub fn record(&self, outcome: ReconcileOutcome) {
        let counter = match outcome {
            ReconcileOutcome::Created => &self.created,
            ReconcileOutcome::Updated => &self.updated,
            ReconcileOutcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a detail page that produced no reconciliation
    pub fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a listing page whose fetch ended its chain
    pub fn record_failed_listing(&self) {
        self.failed_listings.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            created: self.created.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed_listings: self.failed_listings.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`RunStats`]
///
/// Its `Display` form is the run summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed_listings: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fertig. Neu: {}, aktualisiert: {}, übersprungen: {}",
            self.created, self.updated, self.skipped
        )
    }
}
