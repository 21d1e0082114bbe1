/*!
 * Core Types
 * Common types used across the task and scheduler modules
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Task priority (larger is more important, no range constraint)
pub type Priority = i64;

/// Submission-order tiebreaker (smaller runs first among equal priorities)
pub type Sequence = i64;

/// Common result type for scheduler operations
pub type SchedulerResult<T> = Result<T, super::errors::SchedulerError>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique task identity
///
/// Unlike [`Sequence`], which is only ordered within one scheduler, a `TaskId`
/// never repeats across schedulers. It is what makes two queued jobs unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocate the next process-wide id
    #[inline]
    pub fn next() -> Self {
        Self(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a submitted task
///
/// `Queued -> Running -> {Completed | Failed}`, or `Queued -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TaskStatus {
    Queued = 0,
    Running = 1,
    Completed = 2,
    Failed = 3,
    Cancelled = 4,
}

impl TaskStatus {
    /// Whether no further transition is possible
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    #[inline]
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskStatus::Queued,
            1 => TaskStatus::Running,
            2 => TaskStatus::Completed,
            3 => TaskStatus::Failed,
            _ => TaskStatus::Cancelled,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}
