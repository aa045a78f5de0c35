use parking_lot::Mutex;

use std::fmt;
use std::mem;
use std::vec;

/// Handoff of finished work from pool threads to the event loop.
///
/// Any thread may [`push`](Self::push); each push also calls the wake
/// notifier so the loop never has to poll. Only the loop drains, and
/// [`drain_all`](Self::drain_all) takes the whole batch at once, so every
/// pushed item is yielded exactly once.
pub struct CompletionQueue<T> {
    /// Items pushed since the last drain, in push order.
    items: Mutex<Vec<T>>,

    /// Wakes the consumer after a push.
    notify: Box<dyn Fn() + Send + Sync>,
}

impl<T> CompletionQueue<T> {
    /// Creates an empty queue that calls `notify` after every push.
    pub fn new<N>(notify: N) -> Self
    where
        N: Fn() + Send + Sync + 'static,
    {
        Self {
            items: Mutex::new(Vec::new()),
            notify: Box::new(notify),
        }
    }

    /// Appends `item` and wakes the consumer.
    pub fn push(&self, item: T) {
        self.items.lock().push(item);
        (self.notify)();
    }

    /// Removes every queued item as one batch.
    ///
    /// Draining an empty queue returns an empty iterator and has no other
    /// effect.
    pub fn drain_all(&self) -> vec::IntoIter<T> {
        let batch = mem::take(&mut *self.items.lock());
        batch.into_iter()
    }

    /// Returns the number of queued items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> fmt::Debug for CompletionQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionQueue")
            .field("len", &self.len())
            .finish()
    }
}
