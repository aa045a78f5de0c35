use crate::error::{BoxError, Result, StrandError, WorkResult};
use crate::hooks::HookRegistry;
use crate::runtime::core::LoopInner;
use crate::runtime::timer::TimerHandle;
use crate::work::WorkHandle;

use std::rc::{Rc, Weak};
use std::time::Duration;

/// A weak handle to an [`EventLoop`](crate::EventLoop).
///
/// Handles do not keep the loop alive; every operation fails with
/// [`StrandError::NoEventLoop`] once the loop has been dropped.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    inner: Weak<LoopInner>,
}

impl LoopHandle {
    pub(crate) fn new(inner: Weak<LoopInner>) -> Self {
        Self { inner }
    }

    fn upgrade(&self) -> Result<Rc<LoopInner>> {
        self.inner.upgrade().ok_or(StrandError::NoEventLoop)
    }

    /// See [`EventLoop::queue_work`](crate::EventLoop::queue_work).
    pub fn queue_work<T, E, W, C>(&self, tag: &str, work: W, complete: C) -> Result<WorkHandle>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        W: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        C: FnOnce(WorkResult<T>) + 'static,
    {
        self.upgrade()?.queue_work(tag, work, complete)
    }

    /// See [`EventLoop::set_timeout`](crate::EventLoop::set_timeout).
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> Result<TimerHandle>
    where
        F: FnOnce() + 'static,
    {
        self.upgrade()?.set_timeout(delay, callback)
    }

    /// Returns the hook registry of the loop.
    pub fn hooks(&self) -> Result<Rc<HookRegistry>> {
        Ok(self.upgrade()?.hooks().clone())
    }

    /// Returns `true` if the loop is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}
