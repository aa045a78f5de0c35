use crate::resource::AsyncId;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle to queued background work.
///
/// Dropping the handle does **not** cancel the work.
#[derive(Clone, Debug)]
pub struct WorkHandle {
    /// Id of the worker's async resource.
    pub(crate) id: AsyncId,

    /// Flag checked by the pool thread before running the work.
    pub(crate) cancelled: Arc<AtomicBool>,
}

impl WorkHandle {
    /// Returns the id of the worker's async resource.
    pub fn id(&self) -> AsyncId {
        self.id
    }

    /// Requests cancellation.
    ///
    /// If no pool thread has started the work yet, it is skipped and the
    /// completion callback receives [`WorkError::Cancelled`](crate::WorkError::Cancelled).
    /// Work that already started runs to completion. Either way the
    /// callback runs exactly once.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns `true` if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
