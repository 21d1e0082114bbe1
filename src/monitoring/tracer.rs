/*!
 * Structured Tracing
 * Subscriber setup and per-dispatch spans using the tracing crate
 *
 * Features:
 * - Env-driven filtering via RUST_LOG
 * - JSON-formatted logs for structured parsing
 * - One span per dispatched task with its duration embedded
 */

use crate::core::limits::SLOW_TASK_THRESHOLD;
use crate::core::types::{Priority, Sequence, TaskId};
use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - PRIORITY_EXECUTOR_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("PRIORITY_EXECUTOR_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Span covering one task from dispatch to completion
pub struct TaskSpan {
    span: tracing::Span,
    start: Instant,
    id: TaskId,
}

impl TaskSpan {
    pub fn new(id: TaskId, priority: Priority, sequence: Sequence, worker: usize) -> Self {
        let span = span!(
            Level::DEBUG,
            "task",
            task = %id,
            priority = priority,
            sequence = sequence,
            worker = worker,
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            id,
        }
    }

    /// Enter the span context for the duration of the call
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.span.record("outcome", outcome);
    }
}

impl Drop for TaskSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_TASK_THRESHOLD {
            warn!(
                task = %self.id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow task detected"
            );
        } else {
            debug!(task = %self.id, duration_us = duration.as_micros() as u64, "task finished");
        }
    }
}
