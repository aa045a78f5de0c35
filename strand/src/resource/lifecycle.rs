use super::{AsyncId, ResourceState, TypeTag};
use crate::error::{Result, StrandError, panic_message};
use crate::hooks::{HookEvent, HookRegistry};
use crate::runtime::context::{enter_scope, execution_id};

use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A tracked handle for one asynchronous operation.
///
/// Creating the resource reports `init`. Running a callback through
/// [`run_in_scope`](Self::run_in_scope) reports `before` and `after` around
/// it, and dropping the resource reports `destroy`. Transitions only move
/// forward (see [`ResourceState`]); out-of-order requests are rejected
/// without reaching any hook.
///
/// A resource belongs to the event loop thread: it is neither `Send` nor
/// `Sync`, so hooks never observe two transitions of it concurrently.
pub struct AsyncResource {
    /// Process-unique identity.
    id: AsyncId,

    /// Kind of operation, used by hooks for filtering.
    tag: TypeTag,

    /// Resource whose callback was running when this one was created.
    trigger: AsyncId,

    /// Current lifecycle state.
    state: Cell<ResourceState>,

    /// Hooks notified of every transition.
    hooks: Rc<HookRegistry>,
}

impl AsyncResource {
    /// Creates a resource triggered by the current execution scope and
    /// reports `init`.
    pub fn new(hooks: &Rc<HookRegistry>, tag: TypeTag) -> Self {
        Self::with_trigger(hooks, tag, execution_id())
    }

    /// Creates a resource with an explicit trigger id and reports `init`.
    pub fn with_trigger(hooks: &Rc<HookRegistry>, tag: TypeTag, trigger: AsyncId) -> Self {
        let id = AsyncId::next();

        tracing::trace!(%id, %tag, %trigger, "init");
        hooks.emit(HookEvent::Init {
            id,
            tag: tag.clone(),
            trigger,
        });

        Self {
            id,
            tag,
            trigger,
            state: Cell::new(ResourceState::Created),
            hooks: hooks.clone(),
        }
    }

    /// Returns the resource's identity.
    pub fn id(&self) -> AsyncId {
        self.id
    }

    /// Returns the resource's type tag.
    pub fn tag(&self) -> &TypeTag {
        &self.tag
    }

    /// Returns the id of the resource that triggered this one.
    pub fn trigger_id(&self) -> AsyncId {
        self.trigger
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ResourceState {
        self.state.get()
    }

    /// Reports `before`.
    ///
    /// # Errors
    ///
    /// Fails unless the resource is in [`ResourceState::Created`].
    pub fn emit_before(&self) -> Result<()> {
        self.transition(ResourceState::BeforeRunning)?;

        tracing::trace!(id = %self.id, "before");
        self.hooks.emit(HookEvent::Before(self.id));
        Ok(())
    }

    /// Reports `after`.
    ///
    /// # Errors
    ///
    /// Fails unless the resource is in [`ResourceState::BeforeRunning`].
    pub fn emit_after(&self) -> Result<()> {
        self.transition(ResourceState::AfterDone)?;

        tracing::trace!(id = %self.id, "after");
        self.hooks.emit(HookEvent::After(self.id));
        Ok(())
    }

    /// Reports `destroy`.
    ///
    /// This normally happens when the resource is dropped; calling it
    /// explicitly just makes the drop silent.
    ///
    /// # Errors
    ///
    /// Fails if the callback is still running or the resource is already
    /// destroyed.
    pub fn emit_destroy(&self) -> Result<()> {
        self.transition(ResourceState::Destroyed)?;

        tracing::trace!(id = %self.id, "destroy");
        self.hooks.emit(HookEvent::Destroy(self.id));
        Ok(())
    }

    /// Runs `f` as this resource's callback.
    ///
    /// Reports `before`, runs `f` with this resource as the current
    /// execution scope, then reports `after`, also when `f` panics. A panic
    /// is turned into [`StrandError::CallbackPanicked`].
    ///
    /// A resource runs exactly one callback; a second call fails with
    /// [`StrandError::InvalidTransition`] and reports nothing.
    pub fn run_in_scope<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        self.emit_before()?;

        let outcome = enter_scope(self.id, || panic::catch_unwind(AssertUnwindSafe(f)));

        self.emit_after()?;

        outcome.map_err(|payload| {
            let message = panic_message(&*payload);
            tracing::warn!(id = %self.id, tag = %self.tag, %message, "callback panicked");

            StrandError::CallbackPanicked {
                id: self.id,
                message,
            }
        })
    }

    fn transition(&self, next: ResourceState) -> Result<()> {
        let current = self.state.get();

        if !current.can_transition(next) {
            return Err(StrandError::InvalidTransition {
                id: self.id,
                from: current,
                to: next,
            });
        }

        self.state.set(next);
        Ok(())
    }
}

impl Drop for AsyncResource {
    /// Reports whatever is missing to keep hook bookkeeping balanced:
    /// `after` if the callback never returned, then `destroy`.
    fn drop(&mut self) {
        if self.state.get() == ResourceState::BeforeRunning {
            let _ = self.emit_after();
        }

        if self.state.get() != ResourceState::Destroyed {
            let _ = self.emit_destroy();
        }
    }
}

impl fmt::Debug for AsyncResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResource")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("trigger", &self.trigger)
            .field("state", &self.state.get())
            .finish()
    }
}
