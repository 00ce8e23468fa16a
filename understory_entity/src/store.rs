// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The store interface consumed by subsystems that attach state to entities.

use crate::error::EntityError;
use crate::id::EntityId;

/// Access to entity allocation, hierarchy links, and change notification.
///
/// Subsystems that keep their own [`Column`](crate::Column)s take a store
/// handle as an explicit argument rather than reaching for a global. Hosts with
/// their own ECS or scene graph can implement this trait over it;
/// [`World`](crate::World) is the bundled implementation.
pub trait EntityStore {
    /// Allocates a fresh root entity.
    fn create_entity(&mut self) -> Result<EntityId, EntityError>;

    /// Deletes `entity`. Returns `false` if it was not alive.
    fn delete_entity(&mut self, entity: EntityId) -> bool;

    /// Returns `true` if `entity` is alive.
    fn is_alive(&self, entity: EntityId) -> bool;

    /// Returns the hierarchy parent of `entity`, if any.
    fn parent(&self, entity: EntityId) -> Option<EntityId>;

    /// Records that state displayed for `entity` changed and observers
    /// (typically UI) should resynchronize.
    fn mark_needs_resync(&mut self, entity: EntityId);
}
