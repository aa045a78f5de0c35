//! The event loop.
//!
//! This module contains the single-threaded loop that runs every
//! completion callback, timer callback and hook, plus the entry points
//! used to reach it from inside callbacks.
//!
//! It is responsible for:
//! - building the loop and its pool from configuration,
//! - queueing work and timers as tracked async resources,
//! - draining finished work and firing due timers,
//! - tracking which loop and which resource scope is current on a thread.

mod core;
mod handle;
mod timer;

pub(crate) mod builder;
pub(crate) mod context;

pub use self::core::EventLoop;
pub use builder::{ENV_THREAD_NAME, ENV_WORKER_THREADS, LoopBuilder};
pub use handle::LoopHandle;
pub use timer::TimerHandle;

use crate::error::{BoxError, Result, StrandError, WorkResult};
use crate::hooks::HookRegistry;
use crate::work::WorkHandle;

use std::rc::Rc;
use std::time::Duration;

/// Queues background work on the current thread's loop.
///
/// See [`EventLoop::queue_work`].
///
/// # Errors
///
/// Returns [`StrandError::NoEventLoop`] outside of [`EventLoop::run`] and
/// [`EventLoop::enter`], and otherwise whatever the loop returns.
pub fn queue_work<T, E, W, C>(tag: &str, work: W, complete: C) -> Result<WorkHandle>
where
    T: Send + 'static,
    E: Into<BoxError>,
    W: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    C: FnOnce(WorkResult<T>) + 'static,
{
    current()?.queue_work(tag, work, complete)
}

/// Runs `callback` on the current thread's loop after `delay`.
///
/// # Errors
///
/// Returns [`StrandError::NoEventLoop`] if no loop is current.
pub fn set_timeout<F>(delay: Duration, callback: F) -> Result<TimerHandle>
where
    F: FnOnce() + 'static,
{
    current()?.set_timeout(delay, callback)
}

/// Returns the hook registry of the current thread's loop.
///
/// # Errors
///
/// Returns [`StrandError::NoEventLoop`] if no loop is current.
pub fn hooks() -> Result<Rc<HookRegistry>> {
    current()?.hooks()
}

fn current() -> Result<LoopHandle> {
    context::current_loop().ok_or(StrandError::NoEventLoop)
}
