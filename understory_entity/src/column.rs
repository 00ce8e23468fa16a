// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sparse per-entity attribute storage.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::id::EntityId;

/// Sparse storage of one attribute type, keyed by entity.
///
/// A `Column<T>` answers "does this entity carry a `T`, and what is it?".
/// Columns do not observe entity liveness; owners are expected to drop
/// entries for despawned entities themselves.
///
/// A `Column<()>` is a tag set.
///
/// # Example
///
/// ```
/// use understory_entity::{Column, World};
///
/// let mut world = World::new();
/// let e = world.spawn(None).unwrap();
///
/// let mut labels = Column::<&str>::new();
/// labels.insert(e, "root");
/// assert_eq!(labels.get(e), Some(&"root"));
///
/// let mut selected = Column::<()>::new();
/// selected.insert(e, ());
/// assert!(selected.contains(e));
/// ```
#[derive(Debug, Clone)]
pub struct Column<T> {
    values: HashMap<EntityId, T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Column<T> {
    /// Creates an empty column.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Returns the number of entities carrying this attribute.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no entity carries this attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `entity` carries this attribute.
    #[must_use]
    #[inline]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.values.contains_key(&entity)
    }

    /// Returns the attribute on `entity`, if any.
    #[must_use]
    #[inline]
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.values.get(&entity)
    }

    /// Returns the attribute on `entity` mutably, if any.
    #[inline]
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.values.get_mut(&entity)
    }

    /// Sets the attribute on `entity`, returning the previous value.
    pub fn insert(&mut self, entity: EntityId, value: T) -> Option<T> {
        self.values.insert(entity, value)
    }

    /// Returns the attribute on `entity`, inserting `make()` first if absent.
    pub fn get_or_insert_with(&mut self, entity: EntityId, make: impl FnOnce() -> T) -> &mut T {
        match self.values.entry(entity) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(make()),
        }
    }

    /// Removes the attribute from `entity`, returning it.
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        self.values.remove(&entity)
    }

    /// Keeps only the entries for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId, &mut T) -> bool) {
        self.values.retain(|&entity, value| keep(entity, value));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterates over `(entity, attribute)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.values.iter().map(|(&entity, value)| (entity, value))
    }

    /// Iterates mutably over `(entity, attribute)` pairs in unspecified order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.values.iter_mut().map(|(&entity, value)| (entity, value))
    }

    /// Iterates over the entities carrying this attribute.
    pub fn keys(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.values.keys().copied()
    }
}
