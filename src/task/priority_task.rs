/*!
 * Priority Task
 * Value type pairing a unit of work with its priority and sequence
 */

use super::work::Work;
use crate::core::errors::SchedulerError;
use crate::core::types::{Priority, Sequence};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Selection order of two `(priority, sequence)` pairs
///
/// `Less` means the left side is selected sooner: strictly higher priority
/// first, then the smaller sequence.
#[inline]
pub fn compare(
    priority: Priority,
    sequence: Sequence,
    other_priority: Priority,
    other_sequence: Sequence,
) -> Ordering {
    other_priority
        .cmp(&priority)
        .then_with(|| sequence.cmp(&other_sequence))
}

/// A unit of work with scheduling metadata
///
/// Ordering never looks at `work`; equality does. The ordering is only a strict
/// total order while no two tasks share a sequence, so sequences must be unique
/// among tasks that are queued together.
///
/// Sorting a slice of tasks ascending yields dispatch order. A max-heap needs
/// them wrapped in [`std::cmp::Reverse`].
pub struct PriorityTask<W> {
    work: W,
    priority: Priority,
    sequence: Sequence,
}

impl<W> PriorityTask<W> {
    pub fn new(work: W, priority: Priority, sequence: Sequence) -> Self {
        Self {
            work,
            priority,
            sequence,
        }
    }

    /// Build from work that may be absent
    ///
    /// Missing work is a programming error at the call site and is rejected
    /// before the task can reach any queue.
    pub fn from_optional(
        work: Option<W>,
        priority: Priority,
        sequence: Sequence,
    ) -> Result<Self, SchedulerError> {
        match work {
            Some(work) => Ok(Self::new(work, priority, sequence)),
            None => Err(SchedulerError::Construction(format!(
                "no work supplied for task (priority {}, sequence {})",
                priority, sequence
            ))),
        }
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    #[inline]
    pub fn work(&self) -> &W {
        &self.work
    }

    /// Hand the work over, e.g. to a worker
    #[inline]
    pub fn into_work(self) -> W {
        self.work
    }
}

impl<W: Work> PriorityTask<W> {
    /// Run the work once and return its output unchanged
    #[inline]
    pub fn call(self) -> W::Output {
        self.work.call()
    }
}

impl<W: PartialEq> PartialEq for PriorityTask<W> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
            && self.sequence == other.sequence
            && self.work == other.work
    }
}

impl<W: Eq> Eq for PriorityTask<W> {}

/// Dispatch order over `(priority, sequence)` only
///
/// Two tasks with the same priority and sequence compare `Equal` even when
/// their work differs and `==` is false. That departs from the usual `Ord`/`Eq`
/// agreement; it holds again as soon as sequences are unique, which the
/// scheduler guarantees for everything it queues.
impl<W: Eq> Ord for PriorityTask<W> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self.priority, self.sequence, other.priority, other.sequence)
    }
}

impl<W: Eq> PartialOrd for PriorityTask<W> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<W: Hash> Hash for PriorityTask<W> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.work.hash(state);
        self.priority.hash(state);
        self.sequence.hash(state);
    }
}

impl<W: Clone> Clone for PriorityTask<W> {
    fn clone(&self) -> Self {
        Self::new(self.work.clone(), self.priority, self.sequence)
    }
}

impl<W: fmt::Debug> fmt::Debug for PriorityTask<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityTask")
            .field("work", &self.work)
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .finish()
    }
}
