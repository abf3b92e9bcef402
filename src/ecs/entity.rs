//! Entity identifiers
//!
//! Ids are handed out monotonically by the [`World`](super::World) and never
//! reused within a session, so a stale id can only ever resolve to "dead".

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Create an id from a raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E_{}", self.0)
    }
}
