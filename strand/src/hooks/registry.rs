use super::{AsyncHook, HookEvent};

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies an enabled hook so it can be disabled later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// The set of hooks notified of async resource transitions.
///
/// A registry lives on the event loop thread and is shared by reference
/// (`Rc`) with every resource created against it. Loops create their own
/// by default; tests can inject one through
/// [`LoopBuilder::hooks`](crate::LoopBuilder::hooks).
///
/// Events are dispatched to a snapshot of the enabled hooks, so a hook may
/// enable or disable hooks (including itself) while being notified. A hook
/// enabled after a resource's `init` only sees that resource's later events.
pub struct HookRegistry {
    /// Enabled hooks in registration order.
    hooks: RefCell<Vec<(HookId, Rc<dyn AsyncHook>)>>,

    /// Next id handed out by [`enable`](Self::enable).
    next_id: Cell<u64>,
}

impl HookRegistry {
    /// Creates a registry with no hooks.
    pub fn new() -> Self {
        Self {
            hooks: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Enables `hook` and returns its id.
    pub fn enable<H>(&self, hook: H) -> HookId
    where
        H: AsyncHook + 'static,
    {
        self.enable_shared(Rc::new(hook))
    }

    /// Enables a hook that is shared with other owners.
    pub fn enable_shared(&self, hook: Rc<dyn AsyncHook>) -> HookId {
        let id = HookId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.hooks.borrow_mut().push((id, hook));
        tracing::trace!(hook = id.0, "hook enabled");

        id
    }

    /// Disables the hook with the given id.
    ///
    /// Returns `false` if no such hook is enabled.
    pub fn disable(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.borrow_mut();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);

        let removed = hooks.len() != before;
        if removed {
            tracing::trace!(hook = id.0, "hook disabled");
        }
        removed
    }

    /// Returns the number of enabled hooks.
    pub fn len(&self) -> usize {
        self.hooks.borrow().len()
    }

    /// Returns `true` if no hook is enabled.
    pub fn is_empty(&self) -> bool {
        self.hooks.borrow().is_empty()
    }

    /// Reports `event` to every hook enabled at the time of the call.
    pub(crate) fn emit(&self, event: HookEvent) {
        let snapshot: Vec<Rc<dyn AsyncHook>> = self
            .hooks
            .borrow()
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect();

        for hook in snapshot {
            event.dispatch(&*hook);
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.len())
            .finish()
    }
}
