//! Async resources and their lifecycle.
//!
//! An [`AsyncResource`] stands for one asynchronous operation. It carries a
//! process-unique [`AsyncId`], a [`TypeTag`] naming the kind of operation,
//! and the id of the resource whose callback created it. Its transitions
//! (`init`, `before`, `after`, `destroy`) are reported to the
//! [`HookRegistry`](crate::hooks::HookRegistry) it was created with.

mod id;
mod lifecycle;
mod state;
mod tag;

pub use id::AsyncId;
pub use lifecycle::AsyncResource;
pub use state::ResourceState;
pub use tag::{DEFAULT_WORK_TAG, TIMEOUT_TAG, TypeTag};
