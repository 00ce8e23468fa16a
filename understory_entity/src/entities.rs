// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot allocator.

use alloc::vec::Vec;

use crate::error::EntityError;
use crate::id::EntityId;

/// Allocates and frees [`EntityId`]s.
///
/// Slots are recycled through a free list. A recycled slot has its generation
/// bumped so that ids handed out earlier become stale instead of aliasing the
/// new entity.
///
/// An optional capacity limit bounds the number of simultaneously live
/// entities; [`spawn`](Self::spawn) reports [`EntityError::Exhausted`] once it
/// is reached.
///
/// # Example
///
/// ```
/// use understory_entity::Entities;
///
/// let mut entities = Entities::new();
/// let a = entities.spawn().unwrap();
/// assert!(entities.is_alive(a));
///
/// entities.despawn(a);
/// let b = entities.spawn().unwrap();
///
/// // Same slot, new generation.
/// assert_eq!(a.slot(), b.slot());
/// assert!(!entities.is_alive(a));
/// assert!(entities.is_alive(b));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Entities {
    /// Current generation per slot. Even = free, odd = live.
    generations: Vec<u32>,
    /// Freed slots available for reuse.
    free: Vec<u32>,
    /// Number of live entities.
    live: usize,
    /// Maximum number of live entities, if bounded.
    limit: Option<usize>,
}

impl Entities {
    /// Creates an unbounded allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator that refuses to hold more than `limit` live entities.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocates a new entity.
    pub fn spawn(&mut self) -> Result<EntityId, EntityError> {
        if let Some(limit) = self.limit
            && self.live >= limit
        {
            return Err(EntityError::Exhausted { limit });
        }

        let id = if let Some(slot) = self.free.pop() {
            let generation = &mut self.generations[slot as usize];
            *generation = generation.wrapping_add(1);
            EntityId::new(slot, *generation)
        } else {
            let slot = u32::try_from(self.generations.len()).map_err(|_| {
                EntityError::Exhausted {
                    limit: self.generations.len(),
                }
            })?;
            self.generations.push(1);
            EntityId::new(slot, 1)
        };
        self.live += 1;
        Ok(id)
    }

    /// Frees `id`. Returns `false` if it was not alive.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let generation = &mut self.generations[id.idx()];
        *generation = generation.wrapping_add(1);
        self.free.push(id.slot());
        self.live -= 1;
        true
    }

    /// Returns `true` if `id` refers to a live entity.
    #[must_use]
    #[inline]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.generations
            .get(id.idx())
            .is_some_and(|&generation| generation == id.generation() && generation % 2 == 1)
    }

    /// Iterates over all live entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(_, generation)| *generation % 2 == 1)
            .filter_map(|(slot, &generation)| {
                u32::try_from(slot)
                    .ok()
                    .map(|slot| EntityId::new(slot, generation))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_despawn() {
        let mut entities = Entities::new();
        let a = entities.spawn().unwrap();
        let b = entities.spawn().unwrap();
        assert_ne!(a, b);
        assert_eq!(entities.len(), 2);

        assert!(entities.despawn(a));
        assert!(!entities.is_alive(a));
        assert!(entities.is_alive(b));
        assert_eq!(entities.len(), 1);

        // Second despawn is a no-op.
        assert!(!entities.despawn(a));
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn recycled_slots_bump_generation() {
        let mut entities = Entities::new();
        let a = entities.spawn().unwrap();
        entities.despawn(a);
        let b = entities.spawn().unwrap();

        assert_eq!(a.slot(), b.slot());
        assert_ne!(a.generation(), b.generation());
        assert!(!entities.is_alive(a));
        assert!(entities.is_alive(b));
    }

    #[test]
    fn limit_is_enforced() {
        let mut entities = Entities::with_limit(1);
        let a = entities.spawn().unwrap();
        assert_eq!(entities.spawn(), Err(EntityError::Exhausted { limit: 1 }));

        entities.despawn(a);
        assert!(entities.spawn().is_ok());
    }

    #[test]
    fn iter_yields_live_entities() {
        let mut entities = Entities::new();
        let a = entities.spawn().unwrap();
        let b = entities.spawn().unwrap();
        let c = entities.spawn().unwrap();
        entities.despawn(b);

        let live: alloc::vec::Vec<_> = entities.iter().collect();
        assert_eq!(live, [a, c]);
    }
}
