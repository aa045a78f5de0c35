use super::AsyncHook;
use crate::resource::{AsyncId, TypeTag};

/// A hook assembled from closures.
///
/// Only the closures that are set get called; the rest of the events are
/// ignored.
///
/// ```rust,ignore
/// let hook = HookFns::new()
///     .on_init(|id, tag, _| {
///         if tag == "Strand::Test::SleepWorker" {
///             println!("sleep worker {id}");
///         }
///     })
///     .on_before(|id| println!("before {id}"));
/// ```
#[derive(Default)]
pub struct HookFns {
    init: Option<Box<dyn Fn(AsyncId, &TypeTag, AsyncId)>>,
    before: Option<Box<dyn Fn(AsyncId)>>,
    after: Option<Box<dyn Fn(AsyncId)>>,
    destroy: Option<Box<dyn Fn(AsyncId)>>,
}

impl HookFns {
    /// Creates a hook with no closures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the closure called on `init`.
    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: Fn(AsyncId, &TypeTag, AsyncId) + 'static,
    {
        self.init = Some(Box::new(f));
        self
    }

    /// Sets the closure called on `before`.
    pub fn on_before<F>(mut self, f: F) -> Self
    where
        F: Fn(AsyncId) + 'static,
    {
        self.before = Some(Box::new(f));
        self
    }

    /// Sets the closure called on `after`.
    pub fn on_after<F>(mut self, f: F) -> Self
    where
        F: Fn(AsyncId) + 'static,
    {
        self.after = Some(Box::new(f));
        self
    }

    /// Sets the closure called on `destroy`.
    pub fn on_destroy<F>(mut self, f: F) -> Self
    where
        F: Fn(AsyncId) + 'static,
    {
        self.destroy = Some(Box::new(f));
        self
    }
}

impl AsyncHook for HookFns {
    fn init(&self, id: AsyncId, tag: &TypeTag, trigger: AsyncId) {
        if let Some(f) = &self.init {
            f(id, tag, trigger);
        }
    }

    fn before(&self, id: AsyncId) {
        if let Some(f) = &self.before {
            f(id);
        }
    }

    fn after(&self, id: AsyncId) {
        if let Some(f) = &self.after {
            f(id);
        }
    }

    fn destroy(&self, id: AsyncId) {
        if let Some(f) = &self.destroy {
            f(id);
        }
    }
}
