// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entities plus hierarchy plus resync marks.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::entities::Entities;
use crate::error::EntityError;
use crate::hierarchy::{CycleHandling, Hierarchy};
use crate::id::EntityId;
use crate::store::EntityStore;

/// A self-contained [`EntityStore`]: an [`Entities`] allocator, a
/// [`Hierarchy`], and the set of entities marked for resync.
///
/// # Example
///
/// ```
/// use understory_entity::{EntityStore, World};
///
/// let mut world = World::new();
/// let root = world.spawn(None).unwrap();
/// let child = world.spawn(Some(root)).unwrap();
///
/// assert_eq!(world.parent(child), Some(root));
///
/// world.mark_needs_resync(child);
/// assert!(world.needs_resync(child));
/// let marked: Vec<_> = world.drain_resync().collect();
/// assert_eq!(marked, vec![child]);
/// assert!(!world.needs_resync(child));
/// ```
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: Entities,
    hierarchy: Hierarchy,
    resync: HashSet<EntityId>,
    cycle_handling: CycleHandling,
}

impl World {
    /// Creates an empty, unbounded world with default cycle handling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty world holding at most `limit` live entities.
    #[must_use]
    pub fn with_entity_limit(limit: usize) -> Self {
        Self {
            entities: Entities::with_limit(limit),
            ..Self::default()
        }
    }

    /// Creates an empty world with the specified cycle handling.
    #[must_use]
    pub fn with_cycle_handling(cycle_handling: CycleHandling) -> Self {
        Self {
            cycle_handling,
            ..Self::default()
        }
    }

    /// Returns the current cycle handling mode.
    #[must_use]
    pub fn cycle_handling(&self) -> CycleHandling {
        self.cycle_handling
    }

    /// Sets the cycle handling mode for future [`set_parent`](Self::set_parent) calls.
    pub fn set_cycle_handling(&mut self, handling: CycleHandling) {
        self.cycle_handling = handling;
    }

    /// Returns the entity allocator.
    #[must_use]
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Returns the hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Spawns an entity, optionally linked under `parent`.
    pub fn spawn(&mut self, parent: Option<EntityId>) -> Result<EntityId, EntityError> {
        if let Some(parent) = parent
            && !self.entities.is_alive(parent)
        {
            return Err(EntityError::Dead(parent));
        }
        let id = self.entities.spawn()?;
        if parent.is_some() {
            // A fresh entity has no descendants, so this cannot cycle.
            self.hierarchy
                .set_parent(id, parent, CycleHandling::Allow)?;
        }
        Ok(id)
    }

    /// Despawns `entity`, detaching its children to roots.
    ///
    /// Returns `false` if it was not alive.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.entities.despawn(entity) {
            return false;
        }
        self.hierarchy.remove(entity);
        self.resync.remove(&entity);
        true
    }

    /// Returns `true` if `entity` is alive.
    #[must_use]
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.is_alive(entity)
    }

    /// Links `child` under `parent` (or detaches it), honoring the world's
    /// cycle handling. Returns the previous parent.
    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityId>, EntityError> {
        if !self.entities.is_alive(child) {
            return Err(EntityError::Dead(child));
        }
        if let Some(parent) = parent
            && !self.entities.is_alive(parent)
        {
            return Err(EntityError::Dead(parent));
        }
        self.hierarchy
            .set_parent(child, parent, self.cycle_handling)
    }

    /// Returns the parent of `entity`, if any.
    #[must_use]
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.hierarchy.parent(entity)
    }

    /// Returns the children of `entity`.
    #[must_use]
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.hierarchy.children(entity)
    }

    /// Returns `true` if `entity` was marked for resync since the last drain.
    #[must_use]
    pub fn needs_resync(&self, entity: EntityId) -> bool {
        self.resync.contains(&entity)
    }

    /// Drains the entities marked for resync, in unspecified order.
    pub fn drain_resync(&mut self) -> impl Iterator<Item = EntityId> + '_ {
        self.resync.drain()
    }

    /// Takes the entities marked for resync, sorted by id.
    pub fn take_resync(&mut self) -> Vec<EntityId> {
        let mut marked: Vec<_> = self.resync.drain().collect();
        marked.sort_unstable();
        marked
    }
}

impl EntityStore for World {
    fn create_entity(&mut self) -> Result<EntityId, EntityError> {
        self.spawn(None)
    }

    fn delete_entity(&mut self, entity: EntityId) -> bool {
        self.despawn(entity)
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        Self::is_alive(self, entity)
    }

    fn parent(&self, entity: EntityId) -> Option<EntityId> {
        Self::parent(self, entity)
    }

    fn mark_needs_resync(&mut self, entity: EntityId) {
        if self.entities.is_alive(entity) {
            self.resync.insert(entity);
        }
    }
}
