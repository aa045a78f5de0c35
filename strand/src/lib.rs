//! # Strand
//!
//! **Strand** runs blocking work for the **Nebula** ecosystem on a pool of
//! background threads and delivers each result back to a single-threaded
//! event loop, wrapped in a tracked *async resource*.
//!
//! Every piece of background work gets its own resource. Hooks registered
//! on the loop observe its whole life:
//!
//! - `init` when the work is queued,
//! - `before` right before its completion callback runs on the loop,
//! - `after` right after the callback returns (or panics),
//! - `destroy` when the worker is released.
//!
//! Work closures run in parallel on the pool, but transitions, hooks and
//! callbacks all run on the loop thread, so a hook never sees two
//! transitions at once and every `before` is paired with one `after`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strand::{HookFns, WorkResult};
//! use std::time::Duration;
//!
//! #[strand::main]
//! fn main() {
//!     let hooks = strand::hooks().unwrap();
//!     hooks.enable(HookFns::new().on_before(|id| println!("before {id}")));
//!
//!     strand::queue_work(
//!         "Nebula::Example::Sleep",
//!         || {
//!             std::thread::sleep(Duration::from_millis(200));
//!             Ok::<_, strand::BoxError>("done")
//!         },
//!         |result: WorkResult<&str>| println!("{result:?}"),
//!     )
//!     .unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`executor`]: the background thread pool
//! - [`hooks`]: lifecycle hooks and their registry
//! - [`resource`]: async resources, ids and type tags
//! - [`work`]: the completion queue and work handles
//!
//! ## Getting Started
//!
//! Add Strand to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! strand = { git = "https://github.com/Nebula-ecosystem/Strand", package = "strand" }
//! ```

mod error;
mod runtime;
mod utils;

pub mod executor;
pub mod hooks;
pub mod resource;
pub mod work;

pub use error::{BoxError, Result, StrandError, WorkError, WorkResult};
pub use hooks::{AsyncHook, HookEvent, HookFns, HookId, HookRegistry};
pub use resource::{AsyncId, AsyncResource, ResourceState, TypeTag};
pub use runtime::context::execution_id;
pub use runtime::{
    ENV_THREAD_NAME, ENV_WORKER_THREADS, EventLoop, LoopBuilder, LoopHandle, TimerHandle, hooks,
    queue_work, set_timeout,
};
pub use work::WorkHandle;

pub use strand_macros::*;
