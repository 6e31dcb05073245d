//! ID types for world entities.

use serde::{Deserialize, Serialize};

/// Unique identifier for an entity within one simulation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) entity ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

/// Hands out entity ids for a single session.
///
/// Ids restart at 1 for every allocator, so a recording run and its replay
/// assign the same id to the same spawned entity.
#[derive(Debug, Clone)]
pub struct EntityIdAllocator {
    next: u64,
}

impl Default for EntityIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    #[must_use]
    pub const fn allocated(&self) -> u64 {
        self.next - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_sequential() {
        let mut ids = EntityIdAllocator::new();
        assert_eq!(ids.allocate().raw(), 1);
        assert_eq!(ids.allocate().raw(), 2);
        assert_eq!(ids.allocated(), 2);
    }

    #[test]
    fn test_null_id_is_invalid() {
        assert!(!EntityId::NULL.is_valid());
        assert!(EntityId::from_raw(5).is_valid());
    }
}
