// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchical child-alert counting.

use understory_entity::{Column, EntityId, EntityStore};

use crate::config::DEFAULT_MAX_HIERARCHY_DEPTH;
use crate::counter::ChildAlertCounter;
use crate::severity::Severity;
use crate::walk::AncestorScratch;

/// One alert to be counted by [`HierarchyAggregator::aggregate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CountSource {
    /// Entity carrying the active alert.
    pub entity: EntityId,
    /// Where the upward walk starts: the entity's cached parent.
    pub first_parent: Option<EntityId>,
    /// Severity of the active alert.
    pub severity: Severity,
}

/// Maintains [`ChildAlertCounter`]s for every ancestor of an alerting entity.
///
/// Counters are rebuilt rather than patched: a pass zeroes every counter,
/// makes sure each ancestor of each alert has one, increments along each
/// ancestor path, then drops counters left at zero. Rebuilding means a missed
/// decrement can never leave a stale count behind.
///
/// The phases are exposed individually for hosts that drive them from their
/// own scheduler, but they must run in this order within a pass:
///
/// 1. [`reset_all_counters`](Self::reset_all_counters)
/// 2. [`ensure_counters_along_path`](Self::ensure_counters_along_path) for every alert
/// 3. [`increment_along_path`](Self::increment_along_path) for every alert
/// 4. [`prune_empty_counters`](Self::prune_empty_counters)
///
/// [`aggregate`](Self::aggregate) runs all four.
///
/// Upward walks stop at a revisited entity or after `max_depth` ancestors,
/// whichever comes first, so a cyclic hierarchy degrades to partial counts
/// instead of hanging.
///
/// # Example
///
/// ```
/// use understory_alert::{CountSource, HierarchyAggregator, Severity};
/// use understory_entity::World;
///
/// let mut world = World::new();
/// let root = world.spawn(None).unwrap();
/// let child = world.spawn(Some(root)).unwrap();
/// let leaf = world.spawn(Some(child)).unwrap();
///
/// let mut aggregator = HierarchyAggregator::new(64);
/// aggregator.aggregate(
///     &world,
///     &[CountSource {
///         entity: leaf,
///         first_parent: world.parent(leaf),
///         severity: Severity::Error,
///     }],
/// );
///
/// assert_eq!(aggregator.counter(child).unwrap().count(Severity::Error), 1);
/// assert_eq!(aggregator.counter(root).unwrap().count(Severity::Error), 1);
/// assert!(aggregator.counter(leaf).is_none());
/// ```
#[derive(Debug)]
pub struct HierarchyAggregator {
    counters: Column<ChildAlertCounter>,
    scratch: AncestorScratch,
    max_depth: usize,
}

impl Default for HierarchyAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HIERARCHY_DEPTH)
    }
}

impl HierarchyAggregator {
    /// Creates an aggregator whose walks visit at most `max_depth` ancestors.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            counters: Column::new(),
            scratch: AncestorScratch::default(),
            max_depth,
        }
    }

    /// Returns the counter on `entity`, if any.
    #[must_use]
    pub fn counter(&self, entity: EntityId) -> Option<&ChildAlertCounter> {
        self.counters.get(entity)
    }

    /// Iterates over every counter in unspecified order.
    pub fn counters(&self) -> impl Iterator<Item = (EntityId, &ChildAlertCounter)> + '_ {
        self.counters.iter()
    }

    /// Returns the number of entities carrying a counter.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Returns `true` if no entity carries a counter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Runs the full pipeline over `sources`.
    pub fn aggregate<S>(&mut self, store: &S, sources: &[CountSource])
    where
        S: EntityStore + ?Sized,
    {
        self.reset_all_counters();
        for source in sources {
            self.ensure_counters_along_path(store, source.entity);
        }
        for source in sources {
            self.increment_along_path(store, source.entity, source.first_parent, source.severity);
        }
        let pruned = self.prune_empty_counters();
        tracing::trace!(
            sources = sources.len(),
            counters = self.counters.len(),
            pruned,
            "aggregated child alert counts"
        );
    }

    /// Zeroes every counter.
    pub fn reset_all_counters(&mut self) {
        for (_, counter) in self.counters.iter_mut() {
            counter.reset();
        }
    }

    /// Gives every ancestor of `entity` a counter, creating missing ones zeroed.
    ///
    /// A new counter caches its entity's parent at creation.
    pub fn ensure_counters_along_path<S>(&mut self, store: &S, entity: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        if let Err(err) = self
            .scratch
            .walk(store, entity, store.parent(entity), self.max_depth)
        {
            tracing::warn!(%err, "hierarchy walk cut short while creating counters");
        }
        for &ancestor in self.scratch.path() {
            self.counters
                .get_or_insert_with(ancestor, || ChildAlertCounter::new(store.parent(ancestor)));
        }
    }

    /// Counts one `severity` alert on `entity` in every ancestor's counter,
    /// walking up from `first_parent`.
    ///
    /// Ancestors without a counter are skipped; run
    /// [`ensure_counters_along_path`](Self::ensure_counters_along_path) first.
    pub fn increment_along_path<S>(
        &mut self,
        store: &S,
        entity: EntityId,
        first_parent: Option<EntityId>,
        severity: Severity,
    ) where
        S: EntityStore + ?Sized,
    {
        if let Err(err) = self
            .scratch
            .walk(store, entity, first_parent, self.max_depth)
        {
            tracing::warn!(%err, "hierarchy walk cut short while counting alerts");
        }
        for &ancestor in self.scratch.path() {
            if let Some(counter) = self.counters.get_mut(ancestor) {
                counter.increment(severity);
            }
        }
    }

    /// Removes every counter whose counts are all zero. Returns how many went.
    pub fn prune_empty_counters(&mut self) -> usize {
        let before = self.counters.len();
        self.counters.retain(|_, counter| !counter.is_empty());
        before - self.counters.len()
    }

    /// Drops counters on entities that no longer exist. Returns how many went.
    pub(crate) fn reap_dead<S>(&mut self, store: &S) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let before = self.counters.len();
        self.counters.retain(|entity, _| store.is_alive(entity));
        before - self.counters.len()
    }

    /// Refreshes stale cached parents. Returns how many changed.
    pub(crate) fn refresh_cached_parents<S>(&mut self, store: &S) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let mut changed = 0;
        for (entity, counter) in self.counters.iter_mut() {
            let parent = store.parent(entity);
            if counter.cached_parent() != parent {
                counter.set_cached_parent(parent);
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_entity::{CycleHandling, World};

    fn source(world: &World, entity: EntityId, severity: Severity) -> CountSource {
        CountSource {
            entity,
            first_parent: world.parent(entity),
            severity,
        }
    }

    #[test]
    fn counts_reach_every_ancestor() {
        let mut world = World::new();
        let r = world.spawn(None).unwrap();
        let a = world.spawn(Some(r)).unwrap();
        let b = world.spawn(Some(r)).unwrap();
        let a1 = world.spawn(Some(a)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.aggregate(
            &world,
            &[
                source(&world, a1, Severity::Error),
                source(&world, b, Severity::Warning),
                source(&world, a, Severity::Warning),
            ],
        );

        let root = agg.counter(r).unwrap();
        assert_eq!(root.count(Severity::Error), 1);
        assert_eq!(root.count(Severity::Warning), 2);

        // `a`'s own alert is not counted on `a`.
        let mid = agg.counter(a).unwrap();
        assert_eq!(mid.count(Severity::Error), 1);
        assert_eq!(mid.count(Severity::Warning), 0);
        assert_eq!(mid.cached_parent(), Some(r));

        assert!(agg.counter(b).is_none());
        assert!(agg.counter(a1).is_none());
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn rebuild_drops_stale_counters() {
        let mut world = World::new();
        let r = world.spawn(None).unwrap();
        let c = world.spawn(Some(r)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.aggregate(&world, &[source(&world, c, Severity::Error)]);
        assert_eq!(agg.len(), 1);

        agg.aggregate(&world, &[]);
        assert!(agg.is_empty());
    }

    #[test]
    fn phases_compose_manually() {
        let mut world = World::new();
        let r = world.spawn(None).unwrap();
        let c = world.spawn(Some(r)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.reset_all_counters();
        agg.ensure_counters_along_path(&world, c);
        assert!(agg.counter(r).unwrap().is_empty());

        agg.increment_along_path(&world, c, Some(r), Severity::Warning);
        agg.increment_along_path(&world, c, Some(r), Severity::Warning);
        assert_eq!(agg.prune_empty_counters(), 0);
        assert_eq!(agg.counter(r).unwrap().count(Severity::Warning), 2);

        agg.reset_all_counters();
        assert_eq!(agg.prune_empty_counters(), 1);
        assert!(agg.is_empty());
    }

    #[test]
    fn increment_without_counter_is_skipped() {
        let mut world = World::new();
        let r = world.spawn(None).unwrap();
        let c = world.spawn(Some(r)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.increment_along_path(&world, c, Some(r), Severity::Error);
        assert!(agg.is_empty());
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut world = World::with_cycle_handling(CycleHandling::Allow);
        let a = world.spawn(None).unwrap();
        let b = world.spawn(None).unwrap();
        world.set_parent(a, Some(b)).unwrap();
        world.set_parent(b, Some(a)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.aggregate(&world, &[source(&world, a, Severity::Error)]);

        assert_eq!(agg.counter(b).unwrap().count(Severity::Error), 1);
        assert!(agg.counter(a).is_none());
    }

    #[test]
    fn depth_bound_limits_counted_ancestors() {
        let mut world = World::new();
        let mut chain = alloc::vec![world.spawn(None).unwrap()];
        for _ in 0..4 {
            let parent = *chain.last().unwrap();
            chain.push(world.spawn(Some(parent)).unwrap());
        }
        let leaf = *chain.last().unwrap();

        let mut agg = HierarchyAggregator::new(2);
        agg.aggregate(&world, &[source(&world, leaf, Severity::Warning)]);
        assert_eq!(agg.len(), 2);
        assert!(agg.counter(chain[3]).is_some());
        assert!(agg.counter(chain[2]).is_some());
        assert!(agg.counter(chain[0]).is_none());
    }

    #[test]
    fn reap_and_refresh() {
        let mut world = World::new();
        let r1 = world.spawn(None).unwrap();
        let r2 = world.spawn(None).unwrap();
        let c = world.spawn(Some(r1)).unwrap();
        let g = world.spawn(Some(c)).unwrap();

        let mut agg = HierarchyAggregator::default();
        agg.aggregate(&world, &[source(&world, g, Severity::Error)]);
        assert_eq!(agg.refresh_cached_parents(&world), 0);

        world.set_parent(c, Some(r2)).unwrap();
        assert_eq!(agg.refresh_cached_parents(&world), 1);
        assert_eq!(agg.counter(c).unwrap().cached_parent(), Some(r2));

        world.despawn(r1);
        assert_eq!(agg.reap_dead(&world), 1);
        assert!(agg.counter(r1).is_none());
    }
}
