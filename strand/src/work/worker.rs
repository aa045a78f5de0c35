use super::item::ResultSlot;
use crate::error::{Result, WorkError, WorkResult};
use crate::resource::{AsyncId, AsyncResource};

use std::sync::Arc;

/// Loop-side half of a queued piece of background work.
///
/// Owns the async resource and the completion callback. It stays in the
/// loop's pending table while the work item runs on the pool, and is
/// consumed by [`complete`](Self::complete) once the item comes back.
pub(crate) struct AsyncWorker {
    resource: AsyncResource,
    deliver: Box<dyn FnOnce()>,
}

impl AsyncWorker {
    pub(crate) fn new<T, C>(resource: AsyncResource, slot: Arc<ResultSlot<T>>, complete: C) -> Self
    where
        T: 'static,
        C: FnOnce(WorkResult<T>) + 'static,
    {
        let deliver = Box::new(move || {
            let result = slot.take().unwrap_or(Err(WorkError::Missing));
            complete(result);
        });

        Self { resource, deliver }
    }

    pub(crate) fn id(&self) -> AsyncId {
        self.resource.id()
    }

    /// Runs the completion callback inside the worker's resource scope,
    /// then releases the resource.
    ///
    /// `before` and `after` surround the callback, and `destroy` follows
    /// when the resource is dropped here, whether or not the callback
    /// panicked.
    pub(crate) fn complete(self) -> Result<()> {
        let AsyncWorker { resource, deliver } = self;

        tracing::trace!(id = %resource.id(), tag = %resource.tag(), "dispatching completion");
        let outcome = resource.run_in_scope(deliver);

        drop(resource);
        outcome
    }
}
