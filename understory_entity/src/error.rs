// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for entity and hierarchy operations.

use crate::id::EntityId;

/// Errors returned by [`Entities`](crate::Entities), [`Hierarchy`](crate::Hierarchy)
/// and [`World`](crate::World).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    /// No slot could be allocated: the configured capacity limit was reached.
    #[error("entity capacity exhausted (limit {limit})")]
    Exhausted {
        /// The capacity limit in effect.
        limit: usize,
    },
    /// The entity is not alive (never spawned, or already despawned).
    #[error("entity {0} is not alive")]
    Dead(EntityId),
    /// Linking `child` under `parent` would make `child` its own ancestor.
    #[error("parenting {child} under {parent} would create a cycle")]
    Cycle {
        /// The entity being reparented.
        child: EntityId,
        /// The requested parent.
        parent: EntityId,
    },
}
