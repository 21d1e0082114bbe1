/*!
 * Priority Scheduler
 *
 * Bounded-concurrency execution engine. Submitted work is wrapped into a
 * [`PriorityTask`](crate::task::PriorityTask), held in one priority-ordered
 * waiting queue, and dispatched to a fixed pool of OS worker threads.
 *
 * # Dispatch order
 *
 * Every time a worker becomes idle it claims the queued task with the highest
 * priority, and among equal priorities the one submitted first. Selection is
 * atomic under the queue lock, so a task is never handed to two workers and a
 * higher-priority submission always overtakes everything still queued.
 *
 * # Starvation
 *
 * There is no aging. A task whose priority stays below the arrival rate of
 * higher-priority work may wait forever. Callers that care must pick
 * priorities that avoid it.
 *
 * # Shutdown Pattern: Graceful-with-Fallback
 *
 * 1. **Preferred:** `shutdown(mode)` followed by `await_termination(..)`.
 * 2. **Fallback:** dropping the scheduler without shutdown discards queued work,
 *    logs a warning, and lets workers exit after their current task. Drop never
 *    blocks.
 *
 * # Example
 *
 * ```no_run
 * use priority_executor::{PriorityScheduler, ShutdownMode};
 *
 * let scheduler = PriorityScheduler::new(2)?;
 * let handle = scheduler.submit(|| Ok::<_, String>(6 * 7), 10)?;
 * assert_eq!(handle.wait(), Ok(42));
 *
 * scheduler.shutdown(ShutdownMode::Drain);
 * scheduler.await_termination(None);
 * # Ok::<(), priority_executor::SchedulerError>(())
 * ```
 */

mod atomic_stats;
mod config;
mod handle;
mod job;
mod lifecycle;
mod operations;
mod queue;
mod stats;
mod worker;

pub use config::{BackpressurePolicy, SchedulerConfig, ShutdownMode};
pub use handle::TaskHandle;
pub use stats::SchedulerStats;

use crate::core::types::SchedulerResult;
use atomic_stats::AtomicSchedulerStats;
use parking_lot::{Condvar, Mutex};
use queue::QueueState;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::info;

/// State shared by the scheduler, its workers and outstanding handles
pub(crate) struct Shared {
    state: Mutex<QueueState>,
    /// Idle workers wait here
    work_available: Condvar,
    /// Capacity-blocked submitters wait here
    space_available: Condvar,
    /// `await_termination` waits here
    terminated: Condvar,
    stats: AtomicSchedulerStats,
    config: SchedulerConfig,
    workers: usize,
}

/// Priority-ordered worker pool
///
/// # Performance
/// - One mutex guards the heap, sequence counter and in-flight counter
/// - Lock-free atomic stats keep monitoring off the dispatch lock
pub struct PriorityScheduler {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    /// Tracks whether shutdown was requested explicitly (lock-free)
    shutdown_initiated: AtomicBool,
}

impl PriorityScheduler {
    /// Create a scheduler with `workers` threads (0 = available parallelism)
    pub fn new(workers: usize) -> SchedulerResult<Self> {
        Self::with_config(SchedulerConfig::default().with_workers(workers))
    }

    /// Create a scheduler from a full configuration
    pub fn with_config(config: SchedulerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        let workers = config.resolved_workers();

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState::new()),
            work_available: Condvar::new(),
            space_available: Condvar::new(),
            terminated: Condvar::new(),
            stats: AtomicSchedulerStats::new(),
            config,
            workers,
        });

        let scheduler = Self {
            shared,
            handles: Mutex::new(Vec::with_capacity(workers)),
            shutdown_initiated: AtomicBool::new(false),
        };

        for index in 0..workers {
            match worker::spawn(Arc::clone(&scheduler.shared), index) {
                Ok(handle) => scheduler.handles.lock().push(handle),
                Err(e) => {
                    // Release the workers already started before reporting.
                    scheduler.shutdown(ShutdownMode::Discard);
                    return Err(e);
                }
            }
        }

        info!(
            workers,
            capacity = ?scheduler.shared.config.capacity,
            backpressure = ?scheduler.shared.config.backpressure,
            "Priority scheduler started"
        );

        Ok(scheduler)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Concurrency limit (number of worker threads started)
    pub fn workers(&self) -> usize {
        self.shared.workers
    }

    /// Workers still alive
    pub fn live_workers(&self) -> usize {
        self.shared.state.lock().live_workers
    }

    /// Tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.shared.state.lock().len()
    }

    /// Tasks currently executing
    pub fn running(&self) -> usize {
        self.shared.state.lock().running
    }

    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().is_shutdown()
    }
}
