use super::completion::CompletionQueue;
use crate::error::{WorkError, WorkResult, panic_message};
use crate::resource::AsyncId;

use parking_lot::Mutex;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Notice pushed on the completion queue when a work item finishes.
///
/// `token` addresses the pending worker on the loop; `id` guards against
/// the token having been reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Completion {
    pub(crate) token: usize,
    pub(crate) id: AsyncId,
}

/// Where a pool thread leaves the outcome of a work item for the loop.
pub(crate) struct ResultSlot<T> {
    value: Mutex<Option<WorkResult<T>>>,
}

impl<T> ResultSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    pub(crate) fn fill(&self, result: WorkResult<T>) {
        *self.value.lock() = Some(result);
    }

    pub(crate) fn take(&self) -> Option<WorkResult<T>> {
        self.value.lock().take()
    }
}

/// A unit of background work.
///
/// Holds the work closure and everything the pool thread needs to report
/// back: the result slot, the cancellation flag and the completion queue.
pub(crate) struct WorkItem<F, T> {
    work: F,
    completion: Completion,
    slot: Arc<ResultSlot<T>>,
    cancelled: Arc<AtomicBool>,
    completions: Arc<CompletionQueue<Completion>>,
}

impl<F, T> WorkItem<F, T>
where
    F: FnOnce() -> WorkResult<T> + Send + 'static,
    T: Send + 'static,
{
    pub(crate) fn new(
        work: F,
        completion: Completion,
        slot: Arc<ResultSlot<T>>,
        cancelled: Arc<AtomicBool>,
        completions: Arc<CompletionQueue<Completion>>,
    ) -> Self {
        Self {
            work,
            completion,
            slot,
            cancelled,
            completions,
        }
    }

    /// Runs the work on the calling pool thread and hands the outcome to
    /// the loop.
    ///
    /// Errors and panics become [`WorkError`]s; the completion is pushed
    /// the same way in every case.
    pub(crate) fn run(self) {
        let id = self.completion.id;

        let result = if self.cancelled.load(Ordering::Acquire) {
            tracing::trace!(%id, "work cancelled before start");
            Err(WorkError::Cancelled)
        } else {
            match panic::catch_unwind(AssertUnwindSafe(self.work)) {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    tracing::warn!(%id, %message, "work panicked");
                    Err(WorkError::Panicked(message))
                }
            }
        };

        tracing::trace!(%id, ok = result.is_ok(), "work finished");

        self.slot.fill(result);
        self.completions.push(self.completion);
    }
}
