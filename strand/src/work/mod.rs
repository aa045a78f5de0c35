//! Background work with lifecycle tracking.
//!
//! A piece of work is split in two halves:
//! - a work item, which travels to a pool thread, runs the work closure
//!   and leaves its result in a shared slot,
//! - an async worker, which stays on the event loop with the async
//!   resource and the completion callback.
//!
//! The [`CompletionQueue`] carries notice of finished items back to the
//! loop, which then runs the completion callback between the resource's
//! `before` and `after` transitions.

mod completion;
mod handle;

pub(crate) mod item;
pub(crate) mod worker;

pub use completion::CompletionQueue;
pub use handle::WorkHandle;
