use crate::error::{BoxError, Result, StrandError, WorkError, WorkResult};
use crate::executor::Executor;
use crate::hooks::HookRegistry;
use crate::resource::{AsyncId, AsyncResource, TIMEOUT_TAG, TypeTag};
use crate::runtime::context::enter_context;
use crate::runtime::handle::LoopHandle;
use crate::runtime::timer::{Timeout, TimerEntry, TimerHandle};
use crate::utils::Slab;
use crate::work::CompletionQueue;
use crate::work::WorkHandle;
use crate::work::item::{Completion, ResultSlot, WorkItem};
use crate::work::worker::AsyncWorker;

use std::cell::{Cell, RefCell};
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

/// Initial capacity of the pending table.
const PENDING_CAPACITY: usize = 64;

/// A callback waiting on the loop, keyed by token in the pending table.
pub(crate) enum Pending {
    /// Background work whose completion has not been dispatched yet.
    Work(AsyncWorker),

    /// A timeout that has not fired yet.
    Timer(Timeout),
}

impl Pending {
    fn id(&self) -> AsyncId {
        match self {
            Pending::Work(worker) => worker.id(),
            Pending::Timer(timeout) => timeout.resource.id(),
        }
    }

    fn dispatch(self) -> Result<()> {
        match self {
            Pending::Work(worker) => worker.complete(),
            Pending::Timer(timeout) => timeout.fire(),
        }
    }
}

/// Shared state of an event loop.
///
/// Everything here is touched from the loop thread only, except the
/// completion queue, which pool threads push to.
pub(crate) struct LoopInner {
    /// Hooks notified of every resource transition.
    hooks: Rc<HookRegistry>,

    /// Pool running work closures.
    executor: Executor,

    /// Finished work items waiting for dispatch.
    completions: Arc<CompletionQueue<Completion>>,

    /// Wake signals sent by pool threads after a push.
    signals: Receiver<()>,

    /// Workers and timers whose callbacks have not run yet.
    pending: RefCell<Slab<Pending>>,

    /// Min-heap of timer deadlines.
    timers: RefCell<BinaryHeap<TimerEntry>>,

    /// Tie-breaker for timers with equal deadlines.
    timer_seq: Cell<u64>,

    /// Set by [`EventLoop::close`].
    closed: Cell<bool>,

    /// Set while [`drive`](Self::drive) is on the stack.
    running: Cell<bool>,
}

/// Clears the running flag when the drive loop returns or unwinds.
struct Running<'a>(&'a Cell<bool>);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl LoopInner {
    pub(crate) fn new(hooks: Rc<HookRegistry>, executor: Executor) -> Self {
        let (sender, signals) = mpsc::channel();

        let completions = Arc::new(CompletionQueue::new(move || {
            let _ = sender.send(());
        }));

        Self {
            hooks,
            executor,
            completions,
            signals,
            pending: RefCell::new(Slab::new(PENDING_CAPACITY)),
            timers: RefCell::new(BinaryHeap::new()),
            timer_seq: Cell::new(0),
            closed: Cell::new(false),
            running: Cell::new(false),
        }
    }

    pub(crate) fn hooks(&self) -> &Rc<HookRegistry> {
        &self.hooks
    }

    /// Creates a worker for `work` and submits it to the executor.
    pub(crate) fn queue_work<T, E, W, C>(&self, tag: &str, work: W, complete: C) -> Result<WorkHandle>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        W: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        C: FnOnce(WorkResult<T>) + 'static,
    {
        if self.closed.get() {
            return Err(StrandError::LoopClosed);
        }
        if self.executor.is_shutdown() {
            return Err(StrandError::ExecutorShutdown);
        }

        let tag = TypeTag::new(tag)?;
        let resource = AsyncResource::new(&self.hooks, tag);
        let id = resource.id();

        let slot = Arc::new(ResultSlot::new());
        let cancelled = Arc::new(AtomicBool::new(false));

        let worker = AsyncWorker::new(resource, slot.clone(), complete);
        let token = self.pending.borrow_mut().insert(Pending::Work(worker));

        let item = WorkItem::new(
            move || work().map_err(|err| WorkError::Failed(err.into())),
            Completion { token, id },
            slot,
            cancelled.clone(),
            self.completions.clone(),
        );

        if let Err(err) = self.executor.submit(move || item.run()) {
            let abandoned = self.pending.borrow_mut().remove(token);
            drop(abandoned);

            return Err(err);
        }

        tracing::trace!(%id, token, "work queued");
        Ok(WorkHandle { id, cancelled })
    }

    /// Schedules `callback` to run on the loop after `delay`.
    pub(crate) fn set_timeout<F>(self: &Rc<Self>, delay: Duration, callback: F) -> Result<TimerHandle>
    where
        F: FnOnce() + 'static,
    {
        let tag = TypeTag::new(TIMEOUT_TAG)?;
        let resource = AsyncResource::new(&self.hooks, tag);
        let id = resource.id();

        let token = self.pending.borrow_mut().insert(Pending::Timer(Timeout {
            resource,
            callback: Box::new(callback),
        }));

        let seq = self.timer_seq.get();
        self.timer_seq.set(seq + 1);

        self.timers.borrow_mut().push(TimerEntry {
            deadline: Instant::now() + delay,
            seq,
            token,
            id,
        });

        Ok(TimerHandle {
            token,
            id,
            inner: Rc::downgrade(self),
        })
    }

    /// Drops a pending timer; its resource is destroyed immediately.
    pub(crate) fn clear_timer(&self, token: usize, id: AsyncId) -> bool {
        let removed = self
            .pending
            .borrow_mut()
            .remove_if(token, |p| matches!(p, Pending::Timer(_)) && p.id() == id);

        let cleared = removed.is_some();
        drop(removed);

        cleared
    }

    /// Runs the loop until no worker or timer is pending.
    ///
    /// A panicking callback does not stop the batch it belongs to; the
    /// first such panic is returned once the batch is done.
    ///
    /// Fails with [`StrandError::AlreadyRunning`] when called from one of
    /// the loop's own callbacks, so no worker's `before`/`after` pair ever
    /// encloses another worker's transitions.
    pub(crate) fn drive(&self) -> Result<()> {
        if self.running.replace(true) {
            return Err(StrandError::AlreadyRunning);
        }
        let _running = Running(&self.running);

        tracing::debug!(pending = self.pending(), "event loop running");

        let mut first_error = None;

        loop {
            self.dispatch_completions(&mut first_error);
            self.fire_timers(&mut first_error);

            if let Some(err) = first_error.take() {
                return Err(err);
            }

            if self.pending.borrow().is_empty() {
                tracing::debug!("event loop idle");
                return Ok(());
            }

            self.wait();
        }
    }

    /// Runs the completion callback of every finished work item.
    fn dispatch_completions(&self, first_error: &mut Option<StrandError>) {
        for Completion { token, id } in self.completions.drain_all() {
            let entry = self
                .pending
                .borrow_mut()
                .remove_if(token, |p| matches!(p, Pending::Work(_)) && p.id() == id);

            match entry {
                Some(pending) => {
                    if let Err(err) = pending.dispatch() {
                        first_error.get_or_insert(err);
                    }
                }
                None => tracing::warn!(%id, token, "completion for unknown worker"),
            }
        }
    }

    /// Runs every timer whose deadline has passed.
    ///
    /// Cleared timers at the top of the heap are discarded on the way.
    fn fire_timers(&self, first_error: &mut Option<StrandError>) {
        let now = Instant::now();

        loop {
            let entry = {
                let mut timers = self.timers.borrow_mut();

                let due = match timers.peek() {
                    None => break,
                    Some(top) => top.deadline <= now || !self.is_live(top.token, top.id),
                };
                if !due {
                    break;
                }

                timers.pop()
            };

            let Some(entry) = entry else {
                break;
            };

            let pending = self
                .pending
                .borrow_mut()
                .remove_if(entry.token, |p| p.id() == entry.id);

            if let Some(pending) = pending {
                if let Err(err) = pending.dispatch() {
                    first_error.get_or_insert(err);
                }
            }
        }
    }

    fn is_live(&self, token: usize, id: AsyncId) -> bool {
        self.pending
            .borrow()
            .get(token)
            .is_some_and(|p| p.id() == id)
    }

    /// Blocks until a pool thread signals a completion or the next timer
    /// is due.
    fn wait(&self) {
        let next = self.timers.borrow().peek().map(|t| t.deadline);

        match next {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                let _ = self.signals.recv_timeout(timeout);
            }
            None => {
                let _ = self.signals.recv();
            }
        }

        while self.signals.try_recv().is_ok() {}
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    pub(crate) fn close(&self) {
        self.closed.set(true);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

impl Drop for LoopInner {
    /// Stops the pool, then releases every callback that never ran.
    ///
    /// Their resources report `destroy` without `before`/`after`.
    fn drop(&mut self) {
        self.executor.shutdown();
        self.executor.join();

        let abandoned = self.pending.get_mut().drain();
        if !abandoned.is_empty() {
            tracing::debug!(count = abandoned.len(), "dropping pending callbacks");
        }
        drop(abandoned);
    }
}

/// A single-threaded event loop backed by a pool of worker threads.
///
/// The `EventLoop` is responsible for:
/// - queueing background work on its [`Executor`],
/// - running completion callbacks and timers on the calling thread,
/// - reporting async resource transitions to its [`HookRegistry`].
///
/// The loop is not `Send`: every callback and every hook runs on the
/// thread that owns it. Dropping the loop shuts the pool down and
/// destroys the resources of callbacks that never ran.
///
/// # Examples
///
/// ```rust,ignore
/// let event_loop = LoopBuilder::new().worker_threads(2).build()?;
///
/// event_loop.queue_work(
///     "Nebula::Example::Sum",
///     || Ok::<_, BoxError>((1..=100).sum::<u64>()),
///     |result| println!("sum = {:?}", result),
/// )?;
///
/// event_loop.run()?;
/// ```
pub struct EventLoop {
    inner: Rc<LoopInner>,
}

impl EventLoop {
    pub(crate) fn from_parts(hooks: Rc<HookRegistry>, executor: Executor) -> Self {
        Self {
            inner: Rc::new(LoopInner::new(hooks, executor)),
        }
    }

    /// Runs the loop until no work or timer is pending.
    ///
    /// While running, the loop is the current loop of this thread, so
    /// callbacks can use [`queue_work`](crate::queue_work) and
    /// [`set_timeout`](crate::set_timeout).
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::CallbackPanicked`] if a callback panicked. The
    /// panicking callback's `after` and `destroy` have been reported and the
    /// rest of its batch has been dispatched; `run` can be called again to
    /// continue with whatever is still pending.
    ///
    /// Returns [`StrandError::AlreadyRunning`] if called from a callback of
    /// this loop.
    pub fn run(&self) -> Result<()> {
        enter_context(self.handle(), || self.inner.drive())
    }

    /// Runs `f` with this loop installed as the current loop.
    ///
    /// Used for top-level code that queues the initial work before
    /// [`run`](Self::run).
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        enter_context(self.handle(), f)
    }

    /// Queues `work` on the pool and `complete` on this loop.
    ///
    /// An async resource tagged `tag` is created (reporting `init`) before
    /// this returns; `work` has not run yet. Once it has, `complete` runs
    /// on the loop thread with the result, between `before` and `after`.
    ///
    /// # Errors
    ///
    /// - [`StrandError::LoopClosed`] after [`close`](Self::close),
    /// - [`StrandError::ExecutorShutdown`] if the pool is gone,
    /// - [`StrandError::InvalidTypeTag`] if `tag` is not namespaced.
    ///
    /// No resource is created for a closed loop or an invalid tag. If the
    /// pool refuses the job, the resource already reported `init` and
    /// reports `destroy` before this returns; the callback never runs.
    pub fn queue_work<T, E, W, C>(&self, tag: &str, work: W, complete: C) -> Result<WorkHandle>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        W: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        C: FnOnce(WorkResult<T>) + 'static,
    {
        self.inner.queue_work(tag, work, complete)
    }

    /// Runs `callback` on the loop after `delay`.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> Result<TimerHandle>
    where
        F: FnOnce() + 'static,
    {
        self.inner.set_timeout(delay, callback)
    }

    /// Returns the hook registry of this loop.
    pub fn hooks(&self) -> Rc<HookRegistry> {
        self.inner.hooks().clone()
    }

    /// Returns a weak handle to this loop.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle::new(Rc::downgrade(&self.inner))
    }

    /// Stops accepting new work. Work already queued still completes.
    pub fn close(&self) {
        tracing::debug!("event loop closed to new work");
        self.inner.close();
    }

    /// Returns `true` after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Returns the number of workers and timers whose callbacks have not
    /// run yet.
    pub fn pending(&self) -> usize {
        self.inner.pending()
    }

    /// Returns the number of pool threads.
    pub fn worker_threads(&self) -> usize {
        self.inner.executor.threads()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("worker_threads", &self.worker_threads())
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}
