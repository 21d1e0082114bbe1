/*!
 * Worker Threads
 * Idle-wait, claim the minimal task, run it, repeat
 */

use super::config::ShutdownMode;
use super::job::{Job, RunOutcome};
use super::Shared;
use crate::core::errors::SchedulerError;
use crate::core::types::SchedulerResult;
use crate::monitoring::TaskSpan;
use crate::task::PriorityTask;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, warn};

/// Spawn worker `index`; it counts as live from before the spawn
pub(super) fn spawn(shared: Arc<Shared>, index: usize) -> SchedulerResult<JoinHandle<()>> {
    let mut builder =
        thread::Builder::new().name(format!("{}-{}", shared.config.thread_name, index));
    if let Some(size) = shared.config.stack_size {
        builder = builder.stack_size(size);
    }

    shared.state.lock().live_workers += 1;
    let worker_shared = Arc::clone(&shared);
    builder
        .spawn(move || run(worker_shared, index))
        .map_err(|e| {
            shared.state.lock().live_workers -= 1;
            error!(worker = index, error = %e, "Failed to spawn worker");
            SchedulerError::Spawn(e.to_string())
        })
}

fn run(shared: Arc<Shared>, index: usize) {
    let mut guard = WorkerGuard {
        shared: &shared,
        index,
        in_flight: false,
        claimed: None,
    };
    debug!(worker = index, "Worker started");

    while let Some(task) = shared.next_task() {
        guard.in_flight = true;
        let (id, priority, sequence) = (task.work().id(), task.priority(), task.sequence());
        guard.claimed = Some(task);

        let span = TaskSpan::new(id, priority, sequence, index);
        let completion = {
            let _entered = span.enter();
            match guard.claimed.take() {
                Some(task) => task.call(),
                None => break,
            }
        };
        let outcome = completion.outcome();
        match outcome {
            RunOutcome::Completed => span.record_outcome("completed"),
            RunOutcome::Failed => span.record_outcome("failed"),
            RunOutcome::Panicked => {
                span.record_outcome("panicked");
                warn!(worker = index, "Task panicked; worker continues");
            }
        }
        drop(span);

        shared.finish(outcome);
        guard.in_flight = false;
        completion.deliver();
    }

    debug!(worker = index, "Worker exiting");
}

/// Keeps the live-worker count honest even if the loop itself panics
///
/// A task claimed but not yet started is dropped only after the counters are
/// settled, so its handle observes `Abandoned` against up-to-date state. When the
/// last worker goes without a shutdown having been requested, the scheduler
/// shuts itself down in `Discard` mode: nothing could run queued work anymore.
struct WorkerGuard<'a> {
    shared: &'a Shared,
    index: usize,
    in_flight: bool,
    claimed: Option<PriorityTask<Job>>,
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            error!(
                worker = self.index,
                "Worker terminated by an internal error; remaining workers continue"
            );
        }

        let orphaned = {
            let mut state = self.shared.state.lock();
            if self.in_flight {
                state.running -= 1;
            }
            state.live_workers -= 1;

            let orphaned = if state.live_workers == 0 && !state.is_shutdown() {
                state.shutdown = Some(ShutdownMode::Discard);
                Some(state.discard_all())
            } else {
                None
            };
            if state.live_workers == 0 {
                self.shared.terminated.notify_all();
            }
            orphaned
        };

        if let Some(orphaned) = orphaned {
            self.shared.space_available.notify_all();
            self.shared.work_available.notify_all();
            let count = orphaned.len();
            drop(orphaned);
            self.shared.stats.add_cancelled(count as u64);
            error!(
                discarded = count,
                "Last worker lost; scheduler shut down and queued tasks cancelled"
            );
        }

        drop(self.claimed.take());
    }
}

impl Shared {
    /// Block until a task can be claimed; `None` once shut down and drained
    pub(super) fn next_task(&self) -> Option<PriorityTask<Job>> {
        let mut state = self.state.lock();
        loop {
            if let Some(task) = state.take_next() {
                drop(state);
                self.space_available.notify_one();
                return Some(task);
            }
            if state.is_shutdown() && state.is_empty() {
                return None;
            }
            self.work_available.wait(&mut state);
        }
    }

    pub(super) fn finish(&self, outcome: RunOutcome) {
        self.state.lock().running -= 1;
        self.stats.record(outcome);
    }
}
