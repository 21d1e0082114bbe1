/*!
 * Scheduler Jobs
 * Type-erased work as held by the waiting queue
 */

use crate::core::errors::TaskError;
use crate::core::types::{TaskId, TaskStatus};
use crate::task::{CancellationToken, Work};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// How a dispatched job ended, for stats and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    Completed,
    Failed,
    Panicked,
}

/// A finished job whose result has not yet reached its handle
///
/// The worker settles its own bookkeeping first, then calls [`deliver`](Self::deliver),
/// so a woken waiter always observes up-to-date counters.
#[must_use = "the result is lost unless delivered"]
pub(crate) struct Completion {
    outcome: RunOutcome,
    deliver: Box<dyn FnOnce() + Send>,
}

impl Completion {
    #[inline]
    pub fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    pub fn deliver(self) {
        (self.deliver)()
    }
}

/// State shared between a queued job and its handle
#[derive(Debug)]
pub(crate) struct TaskCell {
    status: AtomicU8,
    token: CancellationToken,
}

impl TaskCell {
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(TaskStatus::Queued as u8),
            token: CancellationToken::new(),
        }
    }

    #[inline]
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_status(&self, status: TaskStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

type RunFn = Box<dyn FnOnce(&TaskCell) -> Completion + Send>;

/// A submitted unit of work with its completion sink baked in
///
/// Equality is identity: two jobs are equal only if they carry the same `TaskId`.
pub(crate) struct Job {
    id: TaskId,
    cell: Arc<TaskCell>,
    run: RunFn,
}

impl Job {
    /// Wrap `work` so that its delivered completion lands on `sink`
    pub fn new<T, E, F>(
        id: TaskId,
        cell: Arc<TaskCell>,
        work: F,
        sink: flume::Sender<Result<T, TaskError<E>>>,
    ) -> Self
    where
        T: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&CancellationToken) -> Result<T, E> + Send + 'static,
    {
        let run: RunFn = Box::new(move |cell: &TaskCell| {
            let (result, outcome) =
                match panic::catch_unwind(AssertUnwindSafe(|| work(cell.token()))) {
                    Ok(Ok(value)) => (Ok(value), RunOutcome::Completed),
                    Ok(Err(e)) => (Err(TaskError::Failed(e)), RunOutcome::Failed),
                    Err(payload) => (
                        Err(TaskError::Panicked(panic_message(payload.as_ref()))),
                        RunOutcome::Panicked,
                    ),
                };

            cell.set_status(match outcome {
                RunOutcome::Completed => TaskStatus::Completed,
                RunOutcome::Failed | RunOutcome::Panicked => TaskStatus::Failed,
            });

            Completion {
                outcome,
                deliver: Box::new(move || {
                    // The handle may already be gone; the result is then simply dropped.
                    let _ = sink.send(result);
                }),
            }
        });

        Self { id, cell, run }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn cell(&self) -> &TaskCell {
        &self.cell
    }
}

impl Work for Job {
    type Output = Completion;

    fn call(self) -> Completion {
        let Job { cell, run, .. } = self;
        run(&cell)
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Job {}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("status", &self.cell.status())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with<F>(work: F) -> (Job, Arc<TaskCell>, flume::Receiver<Result<u32, TaskError<String>>>)
    where
        F: FnOnce(&CancellationToken) -> Result<u32, String> + Send + 'static,
    {
        let cell = Arc::new(TaskCell::new());
        let (tx, rx) = flume::bounded(1);
        let job = Job::new(TaskId::next(), Arc::clone(&cell), work, tx);
        (job, cell, rx)
    }

    #[test]
    fn test_completed_job_delivers_value() {
        let (job, cell, rx) = job_with(|_| Ok(42));
        let completion = job.call();
        assert_eq!(completion.outcome(), RunOutcome::Completed);
        assert_eq!(cell.status(), TaskStatus::Completed);
        assert!(rx.try_recv().is_err());

        completion.deliver();
        assert_eq!(rx.recv().unwrap(), Ok(42));
    }

    #[test]
    fn test_failed_job_delivers_error_verbatim() {
        let (job, cell, rx) = job_with(|_| Err("disk full".to_string()));
        let completion = job.call();
        assert_eq!(completion.outcome(), RunOutcome::Failed);
        assert_eq!(cell.status(), TaskStatus::Failed);
        completion.deliver();
        assert_eq!(
            rx.recv().unwrap(),
            Err(TaskError::Failed("disk full".to_string()))
        );
    }

    #[test]
    fn test_panicking_job_is_contained() {
        let (job, cell, rx) = job_with(|_| panic!("kaboom"));
        let completion = job.call();
        assert_eq!(completion.outcome(), RunOutcome::Panicked);
        assert_eq!(cell.status(), TaskStatus::Failed);
        completion.deliver();
        assert_eq!(
            rx.recv().unwrap(),
            Err(TaskError::Panicked("kaboom".to_string()))
        );
    }

    #[test]
    fn test_job_equality_is_identity() {
        let (a, _, _rx_a) = job_with(|_| Ok(1));
        let (b, _, _rx_b) = job_with(|_| Ok(1));
        assert_eq!(a, a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_dropped_receiver_does_not_fail_job() {
        let (job, _, rx) = job_with(|_| Ok(1));
        drop(rx);
        let completion = job.call();
        assert_eq!(completion.outcome(), RunOutcome::Completed);
        completion.deliver();
    }
}
