use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Next identity handed out to an async resource.
///
/// Starts above [`AsyncId::ROOT`] and only ever grows, so an id is never
/// reused for the lifetime of the process.
static NEXT_ID: AtomicU64 = AtomicU64::new(AsyncId::ROOT.0 + 1);

/// Opaque identity of an async resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AsyncId(u64);

impl AsyncId {
    /// The top-level execution scope.
    ///
    /// Code that is not running inside any resource callback executes
    /// under this id, and resources created there report it as their
    /// trigger.
    pub const ROOT: AsyncId = AsyncId(1);

    /// Allocates a fresh, process-unique id.
    pub(crate) fn next() -> Self {
        AsyncId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AsyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
