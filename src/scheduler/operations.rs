/*!
 * Scheduler Core Operations
 * Submission (with backpressure) and cancellation
 */

use super::config::BackpressurePolicy;
use super::handle::TaskHandle;
use super::job::{Job, TaskCell};
use super::{PriorityScheduler, Shared};
use crate::core::errors::{SchedulerError, TaskError};
use crate::core::types::{Priority, SchedulerResult, Sequence, TaskId};
use crate::priority::PriorityCalculator;
use crate::task::CancellationToken;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How an individual submission reacts to a full queue
#[derive(Debug, Clone, Copy)]
enum Admission {
    Block,
    BlockUntil(Instant),
    Reject,
}

impl PriorityScheduler {
    /// Submit `work` at `priority`, applying the configured backpressure policy
    pub fn submit<T, E, F>(&self, work: F, priority: Priority) -> SchedulerResult<TaskHandle<T, E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        self.submit_cancellable(move |_| work(), priority)
    }

    /// Submit work that may poll its [`CancellationToken`] while running
    pub fn submit_cancellable<T, E, F>(
        &self,
        work: F,
        priority: Priority,
    ) -> SchedulerResult<TaskHandle<T, E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&CancellationToken) -> Result<T, E> + Send + 'static,
    {
        let admission = match self.shared.config.backpressure {
            BackpressurePolicy::Block => Admission::Block,
            BackpressurePolicy::Reject => Admission::Reject,
        };
        self.enqueue(work, priority, admission)
    }

    /// Submit without ever blocking, whatever the configured policy
    pub fn try_submit<T, E, F>(
        &self,
        work: F,
        priority: Priority,
    ) -> SchedulerResult<TaskHandle<T, E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        self.enqueue(move |_: &CancellationToken| work(), priority, Admission::Reject)
    }

    /// Submit, waiting at most `timeout` for queue space
    pub fn submit_timeout<T, E, F>(
        &self,
        work: F,
        priority: Priority,
        timeout: Duration,
    ) -> SchedulerResult<TaskHandle<T, E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let admission = match Instant::now().checked_add(timeout) {
            Some(deadline) => Admission::BlockUntil(deadline),
            None => Admission::Block,
        };
        self.enqueue(move |_: &CancellationToken| work(), priority, admission)
    }

    /// Submit with the priority an external calculator assigns to `request`
    pub fn submit_with<R, C, T, E, F>(
        &self,
        calculator: &C,
        request: &R,
        work: F,
    ) -> SchedulerResult<TaskHandle<T, E>>
    where
        R: ?Sized,
        C: PriorityCalculator<R> + ?Sized,
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let priority = calculator.priority(request);
        self.submit(work, priority)
    }

    fn enqueue<T, E, F>(
        &self,
        work: F,
        priority: Priority,
        admission: Admission,
    ) -> SchedulerResult<TaskHandle<T, E>>
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&CancellationToken) -> Result<T, E> + Send + 'static,
    {
        let id = TaskId::next();
        let cell = Arc::new(TaskCell::new());
        let (sink, outcome) = flume::bounded::<Result<T, TaskError<E>>>(1);
        let job = Job::new(id, Arc::clone(&cell), work, sink);

        let sequence = self.shared.admit(job, priority, admission)?;
        debug!(task = %id, priority, sequence, "Task queued");

        Ok(TaskHandle::new(
            id,
            priority,
            sequence,
            cell,
            outcome,
            Arc::downgrade(&self.shared),
        ))
    }
}

impl Shared {
    fn admit(&self, job: Job, priority: Priority, admission: Admission) -> SchedulerResult<Sequence> {
        let capacity = self.config.capacity;
        let mut state = self.state.lock();

        loop {
            if state.is_shutdown() {
                self.stats.inc_rejected();
                return Err(SchedulerError::Shutdown);
            }
            if state.has_space(capacity) {
                break;
            }

            // has_space only fails when a capacity is set
            let cap = capacity.unwrap_or_default();
            match admission {
                Admission::Reject => {
                    self.stats.inc_rejected();
                    warn!(capacity = cap, priority, "Submission rejected, queue at capacity");
                    return Err(SchedulerError::CapacityExceeded { capacity: cap });
                }
                Admission::Block => {
                    self.space_available.wait(&mut state);
                }
                Admission::BlockUntil(deadline) => {
                    if Instant::now() >= deadline {
                        self.stats.inc_rejected();
                        warn!(capacity = cap, priority, "Submission timed out, queue at capacity");
                        return Err(SchedulerError::CapacityExceeded { capacity: cap });
                    }
                    self.space_available.wait_until(&mut state, deadline);
                }
            }
        }

        let sequence = state.push(job, priority);
        drop(state);

        self.stats.inc_submitted();
        self.work_available.notify_one();
        Ok(sequence)
    }

    /// Remove a queued task; `false` if it was already claimed or finished
    pub(super) fn cancel(&self, id: TaskId) -> bool {
        let removed = self.state.lock().remove(id);
        match removed {
            Some(task) => {
                // Dropping the job closes its completion channel outside the lock.
                drop(task);
                self.stats.add_cancelled(1);
                self.space_available.notify_one();
                debug!(task = %id, "Queued task cancelled");
                true
            }
            None => false,
        }
    }
}
