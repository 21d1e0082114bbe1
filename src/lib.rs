/*!
 * Priority Executor Library
 * Priority-ordered task admission and a bounded worker pool that dispatches
 * the most important, then oldest, task first
 */

pub mod core;
pub mod monitoring;
pub mod priority;
pub mod scheduler;
pub mod task;

// Re-exports
pub use crate::core::errors::{SchedulerError, TaskError};
pub use crate::core::types::{Priority, SchedulerResult, Sequence, TaskId, TaskStatus};
pub use monitoring::init_tracing;
pub use priority::{ConstantPriority, PriorityCalculator};
pub use scheduler::{
    BackpressurePolicy, PriorityScheduler, SchedulerConfig, SchedulerStats, ShutdownMode,
    TaskHandle,
};
pub use task::{CancellationToken, PriorityTask, Work};
