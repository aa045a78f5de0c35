//! Internal data structures.
//!
//! The event loop keeps its pending workers and timers in a [`Slab`],
//! addressed by small reusable tokens.

mod slab;

pub(crate) use slab::Slab;
