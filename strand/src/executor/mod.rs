//! Background executor.
//!
//! This module contains the thread pool that runs work closures away from
//! the event loop.
//!
//! It is composed of:
//! - [`Executor`]: pool lifecycle, job submission and shutdown,
//! - `worker`: the loop each pool thread runs,
//! - `injector`: the shared job queue pool threads take work from and
//!   park on.

mod core;
mod injector;
mod worker;

pub use self::core::Executor;
