/*!
 * Scheduler Lifecycle
 * Pause/resume dispatch, shutdown modes, termination and drop fallback
 */

use super::config::ShutdownMode;
use super::PriorityScheduler;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{info, warn};

impl PriorityScheduler {
    /// Stop making dispatch decisions; submissions are still accepted
    pub fn pause(&self) {
        self.shared.state.lock().paused = true;
        info!("Scheduler dispatch paused");
    }

    /// Resume dispatch
    pub fn resume(&self) {
        self.shared.state.lock().paused = false;
        self.shared.work_available.notify_all();
        info!("Scheduler dispatch resumed");
    }

    /// Stop accepting submissions
    ///
    /// `Drain` lets every queued task run; `Discard` reports every queued task as
    /// cancelled. Running tasks always finish. Calling again is allowed and can
    /// escalate `Drain` to `Discard`. Returns the number of tasks discarded by
    /// this call.
    pub fn shutdown(&self, mode: ShutdownMode) -> usize {
        self.shutdown_initiated.store(true, Ordering::SeqCst);

        let (discarded, queued) = {
            let mut state = self.shared.state.lock();
            let effective = state.shutdown.map_or(mode, |current| current.max(mode));
            state.shutdown = Some(effective);
            let discarded = if effective == ShutdownMode::Discard {
                state.discard_all()
            } else {
                Vec::new()
            };
            (discarded, state.len())
        };

        // Wake idle workers so they drain or exit, and blocked submitters so they fail.
        self.shared.work_available.notify_all();
        self.shared.space_available.notify_all();

        let count = discarded.len();
        drop(discarded);
        if count > 0 {
            self.shared.stats.add_cancelled(count as u64);
        }

        info!(mode = ?mode, discarded = count, draining = queued, "Scheduler shutting down");
        count
    }

    /// Wait for every worker to exit; `false` if `timeout` elapsed first
    ///
    /// Without a prior `shutdown` workers never exit, so only a timeout ends the wait.
    pub fn await_termination(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        {
            let mut state = self.shared.state.lock();
            while state.live_workers > 0 {
                match deadline {
                    Some(deadline) => {
                        if self
                            .shared
                            .terminated
                            .wait_until(&mut state, deadline)
                            .timed_out()
                        {
                            if state.live_workers > 0 {
                                return false;
                            }
                        }
                    }
                    None => self.shared.terminated.wait(&mut state),
                }
            }
        }

        let handles: Vec<_> = self.handles.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!("Worker thread ended with a panic");
            }
        }
        true
    }
}

impl Drop for PriorityScheduler {
    fn drop(&mut self) {
        if self.shutdown_initiated.load(Ordering::SeqCst) || self.is_shutdown() {
            return;
        }

        warn!(
            "PriorityScheduler dropped without calling shutdown() - discarding queued tasks. \
             Use `scheduler.shutdown(mode)` for graceful cleanup."
        );
        self.shutdown(ShutdownMode::Discard);
    }
}
