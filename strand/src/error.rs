use crate::resource::{AsyncId, ResourceState};

use std::any::Any;
use std::io;

use thiserror::Error;

/// Boxed error type accepted from work closures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = StrandError> = std::result::Result<T, E>;

/// The outcome handed to a completion callback.
pub type WorkResult<T> = std::result::Result<T, WorkError>;

/// Errors raised by the work itself, captured on the pool thread and
/// delivered to the completion callback.
#[derive(Debug, Error)]
pub enum WorkError {
    /// The work closure returned an error.
    #[error("work failed: {0}")]
    Failed(#[source] BoxError),

    /// The work closure panicked.
    #[error("work panicked: {0}")]
    Panicked(String),

    /// The work was cancelled before a pool thread picked it up.
    #[error("work was cancelled before it started")]
    Cancelled,

    /// The pool thread finished without leaving a result behind.
    #[error("work finished without producing a result")]
    Missing,
}

/// Errors raised by the event loop, the executor and async resources.
#[derive(Debug, Error)]
pub enum StrandError {
    /// No event loop is installed on the calling thread, or it was dropped.
    #[error("no event loop is running on this thread")]
    NoEventLoop,

    /// The event loop was closed and accepts no new work.
    #[error("event loop is closed to new work")]
    LoopClosed,

    /// The event loop was asked to run from inside one of its own callbacks.
    #[error("event loop is already running")]
    AlreadyRunning,

    /// The executor has shut down and accepts no new jobs.
    #[error("executor has shut down")]
    ExecutorShutdown,

    /// A type tag is not a namespaced identifier.
    #[error("invalid type tag {tag:?}: {reason}")]
    InvalidTypeTag { tag: String, reason: &'static str },

    /// An async resource was asked to move out of order.
    #[error("async resource {id}: cannot transition from {from} to {to}")]
    InvalidTransition {
        id: AsyncId,
        from: ResourceState,
        to: ResourceState,
    },

    /// A callback running inside an async resource scope panicked.
    #[error("callback for async resource {id} panicked: {message}")]
    CallbackPanicked { id: AsyncId, message: String },

    /// A configuration value could not be parsed.
    #[error("invalid value for {var}: {reason}")]
    Config { var: &'static str, reason: String },

    /// A pool thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
