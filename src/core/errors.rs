/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Submission-level errors: the task never entered (or never left) the queue
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Cannot construct task: {0}")]
    #[diagnostic(
        code(scheduler::construction),
        help("A priority task needs a unit of work. This is a programming error at the call site.")
    )]
    Construction(String),

    #[error("Scheduler at capacity ({capacity} queued tasks)")]
    #[diagnostic(
        code(scheduler::capacity_exceeded),
        help("Wait for queued tasks to drain, raise the capacity, or use the blocking policy.")
    )]
    CapacityExceeded { capacity: usize },

    #[error("Scheduler is shut down")]
    #[diagnostic(
        code(scheduler::shutdown),
        help("The scheduler no longer accepts work. Create a new scheduler.")
    )]
    Shutdown,

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(scheduler::invalid_config),
        help("Review worker count, capacity and backpressure settings.")
    )]
    InvalidConfig(String),

    #[error("Failed to spawn worker: {0}")]
    #[diagnostic(
        code(scheduler::spawn_failed),
        help("The OS refused to create a thread. Check thread limits and stack size.")
    )]
    Spawn(String),
}

impl SchedulerError {
    /// Whether retrying the same submission later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SchedulerError::CapacityExceeded { .. })
    }
}

/// Completion-level errors, delivered to the submitter's handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError<E> {
    /// The work ran and returned this error, unchanged
    #[error("Task failed: {0}")]
    Failed(E),

    /// The work ran and panicked
    #[error("Task panicked: {0}")]
    Panicked(String),

    /// The task was removed from the queue before any worker claimed it
    #[error("Task cancelled before it started")]
    Cancelled,

    /// The task was dropped without reporting an outcome
    #[error("Task abandoned without an outcome")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// True when the task never started executing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TaskError::Cancelled)
    }

    /// The work's own error, if that is what this is
    pub fn into_failure(self) -> Option<E> {
        match self {
            TaskError::Failed(e) => Some(e),
            _ => None,
        }
    }
}
