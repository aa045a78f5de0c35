//! Lifecycle hooks.
//!
//! Hooks observe every async resource transition on the event loop
//! thread. A hook implements [`AsyncHook`] (or is assembled from closures
//! with [`HookFns`]) and is enabled on a [`HookRegistry`].
//!
//! ```rust,ignore
//! let id = registry.enable(
//!     HookFns::new()
//!         .on_init(|id, tag, trigger| println!("init {id} {tag} from {trigger}"))
//!         .on_after(|id| println!("after {id}")),
//! );
//!
//! registry.disable(id);
//! ```

mod fns;
mod registry;

pub use fns::HookFns;
pub use registry::{HookId, HookRegistry};

use crate::resource::{AsyncId, TypeTag};

/// Observer of async resource transitions.
///
/// Every method defaults to a no-op, so a hook only implements the events
/// it cares about. All methods are called synchronously on the event loop
/// thread.
pub trait AsyncHook {
    /// A resource was created.
    ///
    /// `trigger` is the id of the resource whose callback was running when
    /// this one was created, or [`AsyncId::ROOT`] at top level.
    fn init(&self, id: AsyncId, tag: &TypeTag, trigger: AsyncId) {
        let _ = (id, tag, trigger);
    }

    /// The resource's callback is about to run.
    fn before(&self, id: AsyncId) {
        let _ = id;
    }

    /// The resource's callback has returned or panicked.
    fn after(&self, id: AsyncId) {
        let _ = id;
    }

    /// The resource was reclaimed.
    fn destroy(&self, id: AsyncId) {
        let _ = id;
    }
}

/// One reported transition, in a form that is easy to record and compare.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookEvent {
    Init {
        id: AsyncId,
        tag: TypeTag,
        trigger: AsyncId,
    },
    Before(AsyncId),
    After(AsyncId),
    Destroy(AsyncId),
}

impl HookEvent {
    /// Returns the id of the resource the event belongs to.
    pub fn id(&self) -> AsyncId {
        match self {
            HookEvent::Init { id, .. } => *id,
            HookEvent::Before(id) | HookEvent::After(id) | HookEvent::Destroy(id) => *id,
        }
    }

    /// Delivers the event to `hook`.
    pub(crate) fn dispatch(&self, hook: &dyn AsyncHook) {
        match self {
            HookEvent::Init { id, tag, trigger } => hook.init(*id, tag, *trigger),
            HookEvent::Before(id) => hook.before(*id),
            HookEvent::After(id) => hook.after(*id),
            HookEvent::Destroy(id) => hook.destroy(*id),
        }
    }
}
