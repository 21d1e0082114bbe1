/*!
 * Scheduler Configuration
 *
 * Runtime configuration for worker count, queue capacity and backpressure,
 * loadable from defaults, JSON, or `PRIORITY_EXECUTOR_*` environment variables.
 */

use crate::core::errors::SchedulerError;
use crate::core::limits::{
    DEFAULT_THREAD_NAME, ENV_PREFIX, FALLBACK_WORKERS, MAX_WORKERS, MIN_STACK_SIZE,
};
use crate::core::types::SchedulerResult;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a submission does when the waiting queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressurePolicy {
    /// Suspend the submitter until space frees or the scheduler shuts down
    #[default]
    Block,
    /// Fail immediately with `CapacityExceeded`
    Reject,
}

impl FromStr for BackpressurePolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(BackpressurePolicy::Block),
            "reject" => Ok(BackpressurePolicy::Reject),
            other => Err(SchedulerError::InvalidConfig(format!(
                "unknown backpressure policy '{}' (expected 'block' or 'reject')",
                other
            ))),
        }
    }
}

/// What happens to queued-but-unstarted tasks on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownMode {
    /// Run everything already queued, then stop
    Drain,
    /// Report everything still queued as cancelled
    Discard,
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Worker threads, which is also the concurrency limit. 0 = available parallelism.
    pub workers: usize,
    /// Maximum queued (not yet running) tasks. `None` = unbounded.
    pub capacity: Option<usize>,
    pub backpressure: BackpressurePolicy,
    /// Worker thread name prefix
    pub thread_name: String,
    /// Worker stack size in bytes. `None` = platform default.
    pub stack_size: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            capacity: None,
            backpressure: BackpressurePolicy::Block,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
        }
    }
}

impl SchedulerConfig {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.capacity = None;
        self
    }

    #[must_use]
    pub fn with_backpressure(mut self, policy: BackpressurePolicy) -> Self {
        self.backpressure = policy;
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Worker count with `0` resolved to the machine's available parallelism
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_WORKERS)
                .min(MAX_WORKERS)
        } else {
            self.workers
        }
    }

    pub fn validate(&self) -> SchedulerResult<()> {
        if self.workers > MAX_WORKERS {
            return Err(SchedulerError::InvalidConfig(format!(
                "workers must be at most {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.capacity == Some(0) {
            return Err(SchedulerError::InvalidConfig(
                "capacity must be greater than zero (omit it for unbounded)".into(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(SchedulerError::InvalidConfig(
                "thread_name must not be empty".into(),
            ));
        }
        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(SchedulerError::InvalidConfig(format!(
                    "stack_size must be at least {} bytes, got {}",
                    MIN_STACK_SIZE, size
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> SchedulerResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SchedulerError::InvalidConfig(format!("invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    ///
    /// Environment variables:
    /// - PRIORITY_EXECUTOR_WORKERS: worker count (0 = auto)
    /// - PRIORITY_EXECUTOR_CAPACITY: queue capacity (`unbounded` or empty = none)
    /// - PRIORITY_EXECUTOR_BACKPRESSURE: `block` or `reject`
    /// - PRIORITY_EXECUTOR_THREAD_NAME: worker thread name prefix
    /// - PRIORITY_EXECUTOR_STACK_SIZE: worker stack size in bytes
    pub fn from_env() -> SchedulerResult<Self> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup, then validate
    pub fn apply_env<L>(mut self, lookup: L) -> SchedulerResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(raw) = get("WORKERS") {
            self.workers = parse_usize("WORKERS", &raw)?;
        }
        if let Some(raw) = get("CAPACITY") {
            let raw = raw.trim();
            self.capacity = if raw.is_empty() || raw.eq_ignore_ascii_case("unbounded") {
                None
            } else {
                Some(parse_usize("CAPACITY", raw)?)
            };
        }
        if let Some(raw) = get("BACKPRESSURE") {
            self.backpressure = raw.parse()?;
        }
        if let Some(raw) = get("THREAD_NAME") {
            self.thread_name = raw;
        }
        if let Some(raw) = get("STACK_SIZE") {
            self.stack_size = Some(parse_usize("STACK_SIZE", &raw)?);
        }

        self.validate()?;
        Ok(self)
    }
}

fn parse_usize(name: &str, raw: &str) -> SchedulerResult<usize> {
    raw.trim().parse().map_err(|_| {
        SchedulerError::InvalidConfig(format!(
            "{}{} must be a non-negative integer, got '{}'",
            ENV_PREFIX, name, raw
        ))
    })
}
