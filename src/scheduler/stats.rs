/*!
 * Scheduler Statistics
 * Track and report scheduler throughput and queue occupancy
 */

use super::PriorityScheduler;
use serde::{Deserialize, Serialize};

fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Scheduler statistics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub submitted: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub completed: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub failed: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub panicked: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub cancelled: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub rejected: u64,
    pub queued: usize,
    pub running: usize,
    pub live_workers: usize,
    pub workers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    pub paused: bool,
    pub shutdown: bool,
}

impl SchedulerStats {
    /// Tasks that reached a terminal state
    pub fn finished(&self) -> u64 {
        self.completed + self.failed + self.panicked + self.cancelled
    }
}

impl PriorityScheduler {
    /// Counters are lock-free; queue figures take the lock briefly
    pub fn stats(&self) -> SchedulerStats {
        let counters = self.shared.stats.snapshot();
        let state = self.shared.state.lock();
        SchedulerStats {
            submitted: counters.submitted,
            completed: counters.completed,
            failed: counters.failed,
            panicked: counters.panicked,
            cancelled: counters.cancelled,
            rejected: counters.rejected,
            queued: state.len(),
            running: state.running,
            live_workers: state.live_workers,
            workers: self.shared.workers,
            capacity: self.shared.config.capacity,
            paused: state.paused,
            shutdown: state.is_shutdown(),
        }
    }
}
