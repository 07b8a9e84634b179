//! Live counters for one running batch.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::PairResult;

/// Live counters for a running batch. Workers bump them as pairs finish;
/// any thread may take a snapshot meanwhile.
#[derive(Debug, Default)]
pub struct BatchProgress {
    total_pairs: AtomicU64,
    completed_pairs: AtomicU64,
    failed_pairs: AtomicU64,
}

/// Point-in-time copy of a [`BatchProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Pairs in the batch.
    pub total_pairs: u64,
    /// Pairs with a result, failures included.
    pub completed_pairs: u64,
    /// Completed pairs whose result is a failure.
    pub failed_pairs: u64,
}

impl ProgressSnapshot {
    /// Pairs not yet finished.
    pub const fn remaining(&self) -> u64 {
        self.total_pairs.saturating_sub(self.completed_pairs)
    }
}

impl BatchProgress {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new batch of `total` pairs, clearing previous counts.
    pub fn reset(&self, total: u64) {
        self.total_pairs.store(total, Ordering::Relaxed);
        self.completed_pairs.store(0, Ordering::Relaxed);
        self.failed_pairs.store(0, Ordering::Relaxed);
    }

    /// Counts one finished pair.
    pub fn record(&self, result: &PairResult) {
        if !result.is_success() {
            self.failed_pairs.fetch_add(1, Ordering::Relaxed);
        }
        self.completed_pairs.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the counters for display/reporting.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_pairs: self.total_pairs.load(Ordering::Relaxed),
            completed_pairs: self.completed_pairs.load(Ordering::Relaxed),
            failed_pairs: self.failed_pairs.load(Ordering::Relaxed),
        }
    }
}
