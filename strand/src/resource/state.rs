use std::fmt;

/// Lifecycle state of an [`AsyncResource`](super::AsyncResource).
///
/// States only move forward:
/// `Created -> BeforeRunning -> AfterDone -> Destroyed`.
/// A resource whose callback never ran may go straight from `Created`
/// to `Destroyed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// The resource exists and `init` has been reported.
    Created,

    /// `before` has been reported; the callback is running.
    BeforeRunning,

    /// `after` has been reported; the callback returned or panicked.
    AfterDone,

    /// `destroy` has been reported. Terminal.
    Destroyed,
}

impl ResourceState {
    /// Returns `true` if moving from `self` to `next` is allowed.
    pub fn can_transition(self, next: ResourceState) -> bool {
        use ResourceState::*;

        matches!(
            (self, next),
            (Created, BeforeRunning)
                | (BeforeRunning, AfterDone)
                | (AfterDone, Destroyed)
                | (Created, Destroyed)
        )
    }

    /// Returns the lowercase name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceState::Created => "created",
            ResourceState::BeforeRunning => "before-running",
            ResourceState::AfterDone => "after-done",
            ResourceState::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
