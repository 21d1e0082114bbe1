/*!
 * Priority Calculation
 *
 * Seam for the external policy that maps a domain request (a command, a
 * query, ...) to a numeric priority. The scheduler treats the result as an
 * opaque value; nothing here interprets it.
 */

use crate::core::types::Priority;

/// Maps a request to the priority it should be scheduled with
pub trait PriorityCalculator<R: ?Sized>: Send + Sync {
    fn priority(&self, request: &R) -> Priority;
}

impl<R, F> PriorityCalculator<R> for F
where
    R: ?Sized,
    F: Fn(&R) -> Priority + Send + Sync,
{
    #[inline]
    fn priority(&self, request: &R) -> Priority {
        self(request)
    }
}

/// Assigns the same priority to every request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantPriority(pub Priority);

impl<R: ?Sized> PriorityCalculator<R> for ConstantPriority {
    #[inline]
    fn priority(&self, _request: &R) -> Priority {
        self.0
    }
}
