use crate::error::Result;
use crate::resource::{AsyncId, AsyncResource};
use crate::runtime::core::LoopInner;

use std::cmp::Ordering;
use std::rc::Weak;
use std::time::Instant;

/// An entry in the loop's timer queue.
///
/// Entries are stored in a `BinaryHeap` ordered by deadline. The callback
/// itself lives in the loop's pending table under `token`; `id` detects a
/// timer that was cleared and whose token was reused.
pub(crate) struct TimerEntry {
    /// The time at which the timer should fire.
    pub(crate) deadline: Instant,

    /// Insertion order, breaking ties between equal deadlines.
    pub(crate) seq: u64,

    /// Slot of the timer in the pending table.
    pub(crate) token: usize,

    /// Id of the timer's async resource.
    pub(crate) id: AsyncId,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// Orders timer entries by deadline, then by insertion.
    ///
    /// Note that the comparison is **reversed** so that a
    /// `BinaryHeap<TimerEntry>` behaves as a min-heap,
    /// where the earliest deadline is popped first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Loop-side state of a pending timeout.
pub(crate) struct Timeout {
    pub(crate) resource: AsyncResource,
    pub(crate) callback: Box<dyn FnOnce()>,
}

impl Timeout {
    /// Runs the callback inside the timer's resource scope, then releases
    /// the resource.
    pub(crate) fn fire(self) -> Result<()> {
        let Timeout { resource, callback } = self;

        let outcome = resource.run_in_scope(callback);

        drop(resource);
        outcome
    }
}

/// Handle to a timer created by [`set_timeout`](crate::set_timeout).
#[derive(Clone, Debug)]
pub struct TimerHandle {
    pub(crate) token: usize,
    pub(crate) id: AsyncId,
    pub(crate) inner: Weak<LoopInner>,
}

impl TimerHandle {
    /// Returns the id of the timer's async resource.
    pub fn id(&self) -> AsyncId {
        self.id
    }

    /// Cancels the timer.
    ///
    /// The callback will not run and the resource is destroyed right away.
    /// Returns `false` if the timer already fired, was already cleared or
    /// its loop is gone.
    pub fn clear(&self) -> bool {
        match self.inner.upgrade() {
            Some(inner) => inner.clear_timer(self.token, self.id),
            None => false,
        }
    }
}
