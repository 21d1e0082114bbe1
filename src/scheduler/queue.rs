/*!
 * Waiting Queue
 * Priority-ordered set of not-yet-dispatched tasks and the counters guarded with it
 */

use super::config::ShutdownMode;
use super::job::Job;
use crate::core::types::{Priority, Sequence, TaskId, TaskStatus};
use crate::task::PriorityTask;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Everything behind the scheduler's single lock
///
/// `PriorityTask` orders "selected sooner" as `Less`, so the max-heap holds
/// them reversed and `pop` yields the highest priority, oldest sequence.
pub(super) struct QueueState {
    heap: BinaryHeap<Reverse<PriorityTask<Job>>>,
    next_sequence: Sequence,
    pub running: usize,
    pub live_workers: usize,
    pub paused: bool,
    pub shutdown: Option<ShutdownMode>,
}

impl QueueState {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
            running: 0,
            live_workers: 0,
            paused: false,
            shutdown: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_some()
    }

    #[inline]
    pub fn has_space(&self, capacity: Option<usize>) -> bool {
        capacity.map_or(true, |cap| self.heap.len() < cap)
    }

    /// Allocate the next sequence and insert; both happen under the caller's lock
    pub fn push(&mut self, job: Job, priority: Priority) -> Sequence {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap
            .push(Reverse(PriorityTask::new(job, priority, sequence)));
        sequence
    }

    /// Claim the minimal task, unless paused (shutdown overrides pause)
    pub fn take_next(&mut self) -> Option<PriorityTask<Job>> {
        if self.paused && self.shutdown.is_none() {
            return None;
        }
        let Reverse(task) = self.heap.pop()?;
        task.work().cell().set_status(TaskStatus::Running);
        self.running += 1;
        Some(task)
    }

    /// Remove a queued task by id - O(n) scan + heap rebuild
    pub fn remove(&mut self, id: TaskId) -> Option<PriorityTask<Job>> {
        let mut entries = std::mem::take(&mut self.heap).into_vec();
        let removed = entries
            .iter()
            .position(|Reverse(task)| task.work().id() == id)
            .map(|pos| entries.swap_remove(pos).0);
        self.heap = BinaryHeap::from(entries);

        if let Some(ref task) = removed {
            task.work().cell().set_status(TaskStatus::Cancelled);
        }
        removed
    }

    /// Empty the queue, marking every task cancelled
    pub fn discard_all(&mut self) -> Vec<PriorityTask<Job>> {
        self.heap
            .drain()
            .map(|Reverse(task)| {
                task.work().cell().set_status(TaskStatus::Cancelled);
                task
            })
            .collect()
    }
}
