use super::injector::{Injector, Job};
use super::worker::Worker;
use crate::error::{Result, StrandError};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Fixed-size pool of background threads.
///
/// The `Executor` is responsible for:
/// - spawning the pool threads,
/// - handing submitted jobs to them through the global injector,
/// - managing orderly shutdown and thread joining.
///
/// Jobs run to completion on a pool thread and never on the caller's
/// thread; [`submit`](Self::submit) only enqueues.
pub struct Executor {
    /// Global injector queue shared by all threads.
    injector: Arc<Injector>,

    /// Join handles for pool threads.
    handles: Vec<JoinHandle<()>>,

    /// Number of threads the pool was started with.
    threads: usize,
}

impl Executor {
    /// Creates a new executor with the given number of threads.
    ///
    /// Threads are named `{name_prefix}-{index}`.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::Spawn`] if a thread cannot be spawned. Threads
    /// already started are shut down before returning.
    ///
    /// # Panics
    ///
    /// Panics if `threads == 0`.
    pub fn new(threads: usize, name_prefix: &str) -> Result<Self> {
        assert!(threads > 0, "worker_threads must be > 0");

        let mut executor = Self {
            injector: Arc::new(Injector::new()),
            handles: Vec::with_capacity(threads),
            threads,
        };

        for id in 0..threads {
            let worker = Worker::new(id, executor.injector.clone());

            let handle = thread::Builder::new()
                .name(format!("{name_prefix}-{id}"))
                .spawn(move || worker.run())?;

            executor.handles.push(handle);
        }

        tracing::debug!(threads, name_prefix, "executor started");
        Ok(executor)
    }

    /// Submits a job for background execution.
    ///
    /// Returns immediately; the job runs on the first free pool thread.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::ExecutorShutdown`] after
    /// [`shutdown`](Self::shutdown); the job is dropped without running.
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let job: Job = Box::new(job);

        self.injector
            .push(job)
            .map_err(|_| StrandError::ExecutorShutdown)
    }

    /// Signals all threads to shut down.
    ///
    /// Jobs that have not started are dropped; jobs already running finish.
    pub fn shutdown(&self) {
        self.injector.shutdown();
    }

    /// Returns `true` once shutdown has been signalled.
    pub fn is_shutdown(&self) -> bool {
        self.injector.is_shutdown()
    }

    /// Waits for all threads to terminate.
    ///
    /// This should be called after initiating shutdown.
    pub fn join(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }

    /// Returns the number of pool threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the number of jobs waiting for a thread.
    pub fn pending(&self) -> usize {
        self.injector.len()
    }
}

impl Drop for Executor {
    /// Shuts the pool down and joins every thread.
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}
