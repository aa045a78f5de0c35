use crate::error::{Result, StrandError};

use std::fmt;
use std::sync::Arc;

/// Tag for background work that has no more specific kind.
pub const DEFAULT_WORK_TAG: &str = "Strand::Work::AsyncWorker";

/// Tag of the resources created by [`set_timeout`](crate::set_timeout).
pub const TIMEOUT_TAG: &str = "Strand::Timer::Timeout";

/// Namespaced name of a kind of async resource.
///
/// Hooks filter on it, so it must be stable per kind of work. The accepted
/// form is two or more `::`-separated segments of ASCII alphanumerics or
/// underscores, e.g. `Strand::Test::SleepWorker`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag(Arc<str>);

impl TypeTag {
    /// Validates and wraps a tag.
    ///
    /// # Errors
    ///
    /// Returns [`StrandError::InvalidTypeTag`] if the tag is not namespaced.
    pub fn new(tag: &str) -> Result<Self> {
        let invalid = |reason| StrandError::InvalidTypeTag {
            tag: tag.to_string(),
            reason,
        };

        if tag.is_empty() {
            return Err(invalid("tag is empty"));
        }

        let mut segments = 0;
        for segment in tag.split("::") {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            {
                return Err(invalid("segments may only contain ASCII alphanumerics and '_'"));
            }
            segments += 1;
        }

        if segments < 2 {
            return Err(invalid("expected at least one '::' separator"));
        }

        Ok(Self(Arc::from(tag)))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the tag starts with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for TypeTag {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for TypeTag {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl TryFrom<&str> for TypeTag {
    type Error = StrandError;

    fn try_from(tag: &str) -> Result<Self> {
        TypeTag::new(tag)
    }
}
