/*!
 * Task Handles
 * Submitter-side view of one task: status, cancellation and its outcome
 */

use super::job::TaskCell;
use super::Shared;
use crate::core::errors::TaskError;
use crate::core::types::{Priority, Sequence, TaskId, TaskStatus};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Handle to a submitted task
///
/// The outcome is delivered once. Dropping the handle does not cancel the task.
pub struct TaskHandle<T, E> {
    id: TaskId,
    priority: Priority,
    sequence: Sequence,
    cell: Arc<TaskCell>,
    outcome: flume::Receiver<Result<T, TaskError<E>>>,
    scheduler: Weak<Shared>,
}

impl<T, E> TaskHandle<T, E> {
    pub(super) fn new(
        id: TaskId,
        priority: Priority,
        sequence: Sequence,
        cell: Arc<TaskCell>,
        outcome: flume::Receiver<Result<T, TaskError<E>>>,
        scheduler: Weak<Shared>,
    ) -> Self {
        Self {
            id,
            priority,
            sequence,
            cell,
            outcome,
            scheduler,
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    #[inline]
    pub fn status(&self) -> TaskStatus {
        self.cell.status()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Cancel the task
    ///
    /// Returns `true` if the task was still queued and has been removed; it will
    /// never run. A running task only gets its cancellation token tripped (seen by
    /// work submitted with `submit_cancellable`) and `false` is returned.
    pub fn cancel(&self) -> bool {
        if self.status() == TaskStatus::Queued {
            if let Some(shared) = self.scheduler.upgrade() {
                if shared.cancel(self.id) {
                    return true;
                }
            }
        }
        if self.status() == TaskStatus::Running {
            self.cell.token().cancel();
        }
        false
    }

    /// Block until the task reaches a terminal state
    pub fn wait(self) -> Result<T, TaskError<E>> {
        match self.outcome.recv() {
            Ok(result) => result,
            Err(flume::RecvError::Disconnected) => Err(self.undelivered()),
        }
    }

    /// Block for at most `timeout`; `None` if the task is still pending
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<T, TaskError<E>>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(flume::RecvTimeoutError::Timeout) => None,
            Err(flume::RecvTimeoutError::Disconnected) => Some(Err(self.undelivered())),
        }
    }

    /// Await the outcome without blocking a thread (runtime-agnostic)
    pub async fn wait_async(self) -> Result<T, TaskError<E>> {
        match self.outcome.recv_async().await {
            Ok(result) => result,
            Err(flume::RecvError::Disconnected) => Err(self.undelivered()),
        }
    }

    /// The job was dropped without sending: either cancelled or lost
    fn undelivered(&self) -> TaskError<E> {
        match self.status() {
            TaskStatus::Cancelled => TaskError::Cancelled,
            _ => TaskError::Abandoned,
        }
    }
}

impl<T, E> fmt::Debug for TaskHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("status", &self.status())
            .finish()
    }
}
