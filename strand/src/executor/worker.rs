use super::injector::Injector;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A pool thread of the executor.
///
/// The execution loop is:
/// 1. Exit if shutdown was signalled
/// 2. Take the oldest job from the injector and run it
/// 3. Park if no job is available
pub(crate) struct Worker {
    /// Index of the thread within the pool.
    id: usize,

    /// Shared job queue.
    injector: Arc<Injector>,
}

impl Worker {
    /// Creates a new pool thread state.
    pub(crate) fn new(id: usize, injector: Arc<Injector>) -> Self {
        Self { id, injector }
    }

    /// Runs jobs until shutdown.
    ///
    /// A panicking job is logged and the thread moves on to the next one.
    pub(crate) fn run(&self) {
        tracing::debug!(worker = self.id, "pool thread started");

        loop {
            if self.injector.is_shutdown() {
                break;
            }

            if let Some(job) = self.injector.pop() {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::warn!(worker = self.id, "job panicked");
                }
                continue;
            }

            self.injector.park();
        }

        tracing::debug!(worker = self.id, "pool thread stopped");
    }
}
