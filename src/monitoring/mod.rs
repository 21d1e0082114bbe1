/*!
 * Monitoring
 * Structured logging setup and dispatch tracing
 */

mod tracer;

pub use tracer::{init_tracing, TaskSpan};
