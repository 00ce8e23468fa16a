// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parent/child links between entities.

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::error::EntityError;
use crate::id::EntityId;

/// How to handle cycle detection when linking a child under a parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CycleHandling {
    /// Panic in debug builds, silently ignore the link in release builds.
    #[default]
    DebugAssert,
    /// Return [`EntityError::Cycle`] if a cycle would be created.
    Error,
    /// Silently ignore the link if it would create a cycle.
    Ignore,
    /// Skip cycle detection entirely.
    ///
    /// The resulting graph may be cyclic. Consumers that walk parent links
    /// must bound their walks.
    Allow,
}

type Children = SmallVec<[EntityId; 4]>;

/// Parent links plus per-parent child lists.
///
/// Every entity has at most one parent. Roots have none.
///
/// # Example
///
/// ```
/// use understory_entity::{CycleHandling, Entities, Hierarchy};
///
/// let mut entities = Entities::new();
/// let root = entities.spawn().unwrap();
/// let child = entities.spawn().unwrap();
///
/// let mut hierarchy = Hierarchy::new();
/// hierarchy.set_parent(child, Some(root), CycleHandling::Error).unwrap();
/// assert_eq!(hierarchy.parent(child), Some(root));
/// assert_eq!(hierarchy.children(root), &[child]);
///
/// // root cannot go under its own child.
/// assert!(hierarchy.set_parent(root, Some(child), CycleHandling::Error).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    parents: HashMap<EntityId, EntityId>,
    children: HashMap<EntityId, Children>,
}

impl Hierarchy {
    /// Creates an empty hierarchy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parent of `entity`, if linked.
    #[must_use]
    #[inline]
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.parents.get(&entity).copied()
    }

    /// Returns the children of `entity` in link order.
    #[must_use]
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.children.get(&entity).map_or(&[], |c| c.as_slice())
    }

    /// Returns `true` if `ancestor` is reachable from `entity` by following
    /// parent links (or is `entity` itself).
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(entity);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            if !seen.insert(node) {
                return false;
            }
            current = self.parent(node);
        }
        false
    }

    /// Links `child` under `parent`, or detaches it when `parent` is `None`.
    ///
    /// Returns the previous parent.
    ///
    /// # Cycle Handling
    ///
    /// - [`CycleHandling::DebugAssert`]: Panics in debug builds, leaves the link unchanged in release.
    /// - [`CycleHandling::Error`]: Returns `Err(EntityError::Cycle)`.
    /// - [`CycleHandling::Ignore`]: Leaves the link unchanged and returns the current parent.
    /// - [`CycleHandling::Allow`]: Links without checking.
    pub fn set_parent(
        &mut self,
        child: EntityId,
        parent: Option<EntityId>,
        handling: CycleHandling,
    ) -> Result<Option<EntityId>, EntityError> {
        if let Some(parent) = parent
            && handling != CycleHandling::Allow
            && self.is_ancestor_or_self(child, parent)
        {
            match handling {
                CycleHandling::DebugAssert => {
                    debug_assert!(false, "parenting {child:?} under {parent:?} creates a cycle");
                    return Ok(self.parent(child));
                }
                CycleHandling::Error => return Err(EntityError::Cycle { child, parent }),
                CycleHandling::Ignore => return Ok(self.parent(child)),
                CycleHandling::Allow => {}
            }
        }

        let previous = match parent {
            Some(parent) => self.parents.insert(child, parent),
            None => self.parents.remove(&child),
        };
        if previous == parent {
            return Ok(previous);
        }
        if let Some(previous) = previous {
            self.unlink_child(previous, child);
        }
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(child);
        }
        Ok(previous)
    }

    /// Removes every link touching `entity`.
    ///
    /// Its children become roots.
    pub fn remove(&mut self, entity: EntityId) {
        if let Some(parent) = self.parents.remove(&entity) {
            self.unlink_child(parent, entity);
        }
        if let Some(children) = self.children.remove(&entity) {
            for child in children {
                self.parents.remove(&child);
            }
        }
    }

    fn unlink_child(&mut self, parent: EntityId, child: EntityId) {
        if let Some(list) = self.children.get_mut(&parent) {
            list.retain(|c| *c != child);
            if list.is_empty() {
                self.children.remove(&parent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entities;

    fn spawn3() -> (EntityId, EntityId, EntityId) {
        let mut entities = Entities::new();
        (
            entities.spawn().unwrap(),
            entities.spawn().unwrap(),
            entities.spawn().unwrap(),
        )
    }

    #[test]
    fn reparent_moves_child_lists() {
        let (a, b, c) = spawn3();
        let mut h = Hierarchy::new();

        assert_eq!(h.set_parent(c, Some(a), CycleHandling::Error), Ok(None));
        assert_eq!(h.set_parent(c, Some(b), CycleHandling::Error), Ok(Some(a)));

        assert!(h.children(a).is_empty());
        assert_eq!(h.children(b), &[c]);
        assert_eq!(h.parent(c), Some(b));

        assert_eq!(h.set_parent(c, None, CycleHandling::Error), Ok(Some(b)));
        assert_eq!(h.parent(c), None);
        assert!(h.children(b).is_empty());
    }

    #[test]
    fn cycle_modes() {
        let (a, b, _) = spawn3();
        let mut h = Hierarchy::new();
        h.set_parent(b, Some(a), CycleHandling::Error).unwrap();

        assert_eq!(
            h.set_parent(a, Some(b), CycleHandling::Error),
            Err(EntityError::Cycle {
                child: a,
                parent: b
            })
        );
        assert!(h.set_parent(a, Some(a), CycleHandling::Error).is_err());

        assert_eq!(h.set_parent(a, Some(b), CycleHandling::Ignore), Ok(None));
        assert_eq!(h.parent(a), None);

        assert_eq!(h.set_parent(a, Some(b), CycleHandling::Allow), Ok(None));
        assert_eq!(h.parent(a), Some(b));
        assert_eq!(h.parent(b), Some(a));
    }

    #[test]
    fn ancestor_query_terminates_on_cycles() {
        let (a, b, c) = spawn3();
        let mut h = Hierarchy::new();
        h.set_parent(a, Some(b), CycleHandling::Allow).unwrap();
        h.set_parent(b, Some(a), CycleHandling::Allow).unwrap();

        assert!(h.is_ancestor_or_self(b, a));
        assert!(!h.is_ancestor_or_self(c, a));
    }

    #[test]
    fn remove_detaches_children() {
        let (a, b, c) = spawn3();
        let mut h = Hierarchy::new();
        h.set_parent(b, Some(a), CycleHandling::Error).unwrap();
        h.set_parent(c, Some(b), CycleHandling::Error).unwrap();

        h.remove(b);
        assert_eq!(h.parent(c), None);
        assert!(h.children(a).is_empty());
        assert!(h.children(b).is_empty());
    }
}
