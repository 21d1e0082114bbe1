/*!
 * Scheduler Limits and Constants
 *
 * Centralized location for scheduler-wide limits and defaults.
 */

use std::time::Duration;

/// Upper bound on worker threads per scheduler
pub const MAX_WORKERS: usize = 1024;

/// Worker count used when available parallelism cannot be detected
pub const FALLBACK_WORKERS: usize = 4;

/// Default worker thread name prefix (suffixed with `-{index}`)
pub const DEFAULT_THREAD_NAME: &str = "prio-worker";

/// Smallest stack a worker thread may be configured with (64KB)
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PRIORITY_EXECUTOR_";

/// Tasks running longer than this are logged as slow
pub const SLOW_TASK_THRESHOLD: Duration = Duration::from_secs(1);
