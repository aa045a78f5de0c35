//! Configuration of an [`EventLoop`].
//!
//! # Configuration precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: builder methods called after the environment was
//!    applied (`worker_threads(4)`)
//! 2. **Environment variables**: `STRAND_*` values applied by
//!    [`LoopBuilder::from_env`]
//! 3. **Defaults**
//!
//! # Supported environment variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `STRAND_WORKER_THREADS` | `usize` (> 0) | `worker_threads` |
//! | `STRAND_THREAD_NAME` | `String` | `thread_name` |

use super::core::EventLoop;
use crate::error::{Result, StrandError};
use crate::executor::Executor;
use crate::hooks::HookRegistry;

use std::rc::Rc;
use std::thread;

/// Environment variable name for the pool size.
pub const ENV_WORKER_THREADS: &str = "STRAND_WORKER_THREADS";

/// Environment variable name for the pool thread name prefix.
pub const ENV_THREAD_NAME: &str = "STRAND_THREAD_NAME";

/// Default prefix of pool thread names.
const DEFAULT_THREAD_NAME: &str = "strand-worker";

/// Builder for configuring and creating an event loop.
///
/// # Examples
///
/// ```rust,ignore
/// let event_loop = LoopBuilder::from_env()?
///     .worker_threads(4)
///     .build()?;
/// ```
pub struct LoopBuilder {
    /// Number of pool threads.
    worker_threads: usize,

    /// Prefix of pool thread names.
    thread_name: String,

    /// Registry to report to; a fresh one is created if unset.
    hooks: Option<Rc<HookRegistry>>,
}

impl LoopBuilder {
    /// Creates a new `LoopBuilder` with default configuration.
    ///
    /// By default, the number of pool threads is set to the number
    /// of available logical CPUs, falling back to `1` if unavailable.
    pub fn new() -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            worker_threads,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            hooks: None,
        }
    }

    /// Creates a builder with defaults overridden by `STRAND_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self> {
        Self::new().apply_env_with(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// Only variables for which `lookup` returns a value are applied.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::Config`] if a value cannot be parsed.
    pub fn apply_env_with<L>(mut self, lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_WORKER_THREADS) {
            self.worker_threads = parse_threads(ENV_WORKER_THREADS, &val)?;
        }

        if let Some(val) = lookup(ENV_THREAD_NAME) {
            let val = val.trim();
            if val.is_empty() {
                return Err(StrandError::Config {
                    var: ENV_THREAD_NAME,
                    reason: "expected a non-empty name".to_string(),
                });
            }
            self.thread_name = val.to_string();
        }

        Ok(self)
    }

    /// Sets the number of pool threads.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = n;
        self
    }

    /// Sets the prefix of pool thread names.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Reports resource transitions to `hooks` instead of a fresh registry.
    pub fn hooks(mut self, hooks: Rc<HookRegistry>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Builds the event loop and starts its pool.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::Spawn`] if a pool thread cannot be started.
    pub fn build(self) -> Result<EventLoop> {
        let executor = Executor::new(self.worker_threads, &self.thread_name)?;
        let hooks = self.hooks.unwrap_or_default();

        Ok(EventLoop::from_parts(hooks, executor))
    }
}

impl Default for LoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_threads(var: &'static str, val: &str) -> Result<usize> {
    match val.trim().parse::<usize>() {
        Ok(0) => Err(StrandError::Config {
            var,
            reason: "expected at least one thread, got 0".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(err) => Err(StrandError::Config {
            var,
            reason: format!("expected unsigned integer, got {val:?} ({err})"),
        }),
    }
}
