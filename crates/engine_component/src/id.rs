//! Object identity.
//!
//! Ids come from a per-manager counter and are never reused. A handle to a
//! destroyed object therefore stays dead: looking it up fails instead of
//! finding whatever object took its place.

use std::fmt;

/// Stable handle to an object.
///
/// Stays valid while the manager compacts its storage; positions are never
/// exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// Hands out object ids in creation order, starting at 1.
#[derive(Debug)]
pub(crate) struct IdSequence {
    last: u64,
}

impl IdSequence {
    pub(crate) fn new() -> Self {
        Self { last: 0 }
    }

    pub(crate) fn next_id(&mut self) -> ObjectId {
        self.last += 1;
        ObjectId(self.last)
    }
}
