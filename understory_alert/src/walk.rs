// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded upward walks over parent links.

use hashbrown::HashSet;
use smallvec::SmallVec;
use understory_entity::{EntityId, EntityStore};

/// Why an upward walk stopped before reaching a root.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    /// The parent chain above `origin` revisits `at`.
    #[error("parent links above {origin} loop back to {at}")]
    Cycle {
        /// Entity the walk started from.
        origin: EntityId,
        /// First entity visited twice.
        at: EntityId,
    },
    /// More than `limit` ancestors above `origin`.
    #[error("more than {limit} ancestors above {origin}")]
    TooDeep {
        /// Entity the walk started from.
        origin: EntityId,
        /// The configured depth bound.
        limit: usize,
    },
}

/// Reusable state for ancestor walks.
///
/// Keeps capacity across walks; reuse one per aggregation pass.
#[derive(Debug, Default)]
pub(crate) struct AncestorScratch {
    path: SmallVec<[EntityId; 16]>,
    visited: HashSet<EntityId>,
}

impl AncestorScratch {
    /// Collects the ancestors of `origin`, starting at `first`, nearest first.
    ///
    /// On error the path holds every ancestor visited before the guard
    /// tripped, each once.
    pub(crate) fn walk<S>(
        &mut self,
        store: &S,
        origin: EntityId,
        first: Option<EntityId>,
        max_depth: usize,
    ) -> Result<(), WalkError>
    where
        S: EntityStore + ?Sized,
    {
        self.path.clear();
        self.visited.clear();
        self.visited.insert(origin);

        let mut current = first;
        while let Some(node) = current {
            if !self.visited.insert(node) {
                return Err(WalkError::Cycle { origin, at: node });
            }
            if self.path.len() >= max_depth {
                return Err(WalkError::TooDeep {
                    origin,
                    limit: max_depth,
                });
            }
            self.path.push(node);
            current = store.parent(node);
        }
        Ok(())
    }

    pub(crate) fn path(&self) -> &[EntityId] {
        &self.path
    }
}
