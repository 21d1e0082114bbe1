/*!
 * Cooperative Cancellation
 * Flag shared between a task handle and running work
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation request visible to running work
///
/// The scheduler never interrupts running work. Work submitted through
/// `submit_cancellable` may poll this token and return early.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
