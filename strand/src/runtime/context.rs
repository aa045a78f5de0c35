use crate::resource::AsyncId;
use crate::runtime::handle::LoopHandle;

use std::cell::{Cell, RefCell};

thread_local! {
    /// Handle to the event loop installed on this thread.
    ///
    /// Set while the loop runs or while top-level code executes inside
    /// [`EventLoop::enter`](crate::EventLoop::enter), so callbacks can queue
    /// work and timers without threading a handle through every closure.
    pub(crate) static CURRENT_LOOP: RefCell<Option<LoopHandle>> =
        const { RefCell::new(None) };

    /// Id of the async resource whose callback is executing on this thread.
    pub(crate) static EXECUTION_ID: Cell<AsyncId> = const { Cell::new(AsyncId::ROOT) };
}

/// Installs `handle` as the current loop for the duration of `f`.
///
/// The previous loop, if any, is restored afterwards, also when `f`
/// unwinds.
pub(crate) fn enter_context<R>(handle: LoopHandle, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<LoopHandle>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let prev = self.0.take();
            CURRENT_LOOP.with(|cell| *cell.borrow_mut() = prev);
        }
    }

    let prev = CURRENT_LOOP.with(|cell| cell.borrow_mut().replace(handle));
    let _restore = Restore(prev);

    f()
}

/// Runs `f` with `id` as the current execution id.
pub(crate) fn enter_scope<R>(id: AsyncId, f: impl FnOnce() -> R) -> R {
    struct Restore(AsyncId);

    impl Drop for Restore {
        fn drop(&mut self) {
            EXECUTION_ID.with(|cell| cell.set(self.0));
        }
    }

    let _restore = Restore(EXECUTION_ID.with(|cell| cell.replace(id)));

    f()
}

/// Returns the handle of the loop installed on this thread, if any.
pub(crate) fn current_loop() -> Option<LoopHandle> {
    CURRENT_LOOP.with(|cell| cell.borrow().clone())
}

/// Returns the id of the async resource whose callback is running.
///
/// Outside of any callback this is [`AsyncId::ROOT`].
pub fn execution_id() -> AsyncId {
    EXECUTION_ID.with(Cell::get)
}
