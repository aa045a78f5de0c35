use parking_lot::{Condvar, Mutex};

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// A job submitted to the pool.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Longest a pool thread sleeps before re-checking for work and shutdown.
const PARK_TIMEOUT: Duration = Duration::from_millis(50);

/// Global job queue of the executor.
///
/// Submitted jobs are pushed here and picked up by whichever pool thread
/// gets to them first. The injector also coordinates parking: idle
/// threads sleep on a condition variable until a job arrives or shutdown
/// is signalled.
pub(crate) struct Injector {
    /// Jobs waiting for a pool thread, oldest first.
    queue: Mutex<VecDeque<Job>>,

    /// Condition variable used to wake parked threads.
    condvar: Condvar,

    /// Indicates whether the executor is shutting down.
    shutdown: AtomicBool,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Signals shutdown and wakes all parked threads.
    ///
    /// Jobs still queued are dropped without running.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);

        let dropped: Vec<Job> = self.queue.lock().drain(..).collect();
        if !dropped.is_empty() {
            tracing::debug!(jobs = dropped.len(), "dropping queued jobs on shutdown");
        }

        self.condvar.notify_all();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Pushes a job and wakes one parked thread.
    ///
    /// Returns the job back if the injector is shut down.
    pub(crate) fn push(&self, job: Job) -> Result<(), Job> {
        let mut queue = self.queue.lock();

        if self.is_shutdown() {
            return Err(job);
        }

        queue.push_back(job);
        drop(queue);

        self.condvar.notify_one();
        Ok(())
    }

    /// Takes the oldest job, if any.
    pub(crate) fn pop(&self) -> Option<Job> {
        self.queue.lock().pop_front()
    }

    /// Parks the calling thread until a job is pushed, shutdown is
    /// signalled or the park timeout elapses.
    ///
    /// Returns immediately if there is already work or shutdown has begun.
    pub(crate) fn park(&self) {
        let mut queue = self.queue.lock();

        if self.is_shutdown() || !queue.is_empty() {
            return;
        }

        let _ = self.condvar.wait_for(&mut queue, PARK_TIMEOUT);
    }

    /// Returns the number of queued jobs.
    pub(crate) fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
