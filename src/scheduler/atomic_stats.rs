/*!
 * Lock-Free Scheduler Statistics
 * Uses atomic counters for zero-contention stats tracking in hot dispatch paths
 */

use super::job::RunOutcome;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic event counters
///
/// # Performance
/// - Cache-line aligned to prevent false sharing with the queue lock
/// - All operations use relaxed ordering; counters are for monitoring only
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub(crate) struct AtomicSchedulerStats {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
    cancelled: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CounterSnapshot {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub panicked: u64,
    pub cancelled: u64,
    pub rejected: u64,
}

impl AtomicSchedulerStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_cancelled(&self, count: u64) {
        self.cancelled.fetch_add(count, Ordering::Relaxed);
    }

    /// Record how a dispatched task ended
    #[inline]
    pub fn record(&self, outcome: RunOutcome) {
        let counter = match outcome {
            RunOutcome::Completed => &self.completed,
            RunOutcome::Failed => &self.failed,
            RunOutcome::Panicked => &self.panicked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Counter values may be slightly inconsistent with each other under
    /// concurrent updates, but each one is accurate.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = AtomicSchedulerStats::new();
        stats.inc_submitted();
        stats.inc_submitted();
        stats.inc_rejected();
        stats.add_cancelled(3);
        stats.record(RunOutcome::Completed);
        stats.record(RunOutcome::Failed);
        stats.record(RunOutcome::Panicked);

        let snap = stats.snapshot();
        assert_eq!(snap.submitted, 2);
        assert_eq!(snap.rejected, 1);
        assert_eq!(snap.cancelled, 3);
        assert_eq!(snap.completed, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.panicked, 1);
    }
}
