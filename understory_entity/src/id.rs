// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entity identifiers.

use core::fmt;

/// Identifier for an entity in a [`World`](crate::World).
///
/// This is a small, copyable handle that stays stable for the lifetime of the
/// entity but becomes invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On spawn, a fresh slot is allocated with generation `1`.
/// - On despawn, the slot is freed; any existing `EntityId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `EntityId`.
///
/// Stale ids never alias a different live entity because the generation must match.
/// Use [`Entities::is_alive`](crate::Entities::is_alive) to check liveness.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32, u32);

impl EntityId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    /// Returns the slot index of this id.
    #[must_use]
    #[inline]
    pub const fn slot(self) -> u32 {
        self.0
    }

    /// Returns the generation of this id.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.1
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.0, self.1)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.0, self.1)
    }
}
