// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pass scheduler.
//!
//! A pass runs the reactive steps in a fixed order:
//!
//! 1. Reap state left on entities that another subsystem deleted.
//! 2. Merge raised alerts into their chains, in raise order.
//! 3. Refresh cached parents that no longer match the hierarchy.
//! 4. Rebuild child-alert counters, if anything above asked for it.

use alloc::vec::Vec;

use hashbrown::HashMap;
use understory_entity::{EntityId, EntityStore};

use crate::aggregate::CountSource;
use crate::alerts::Alerts;
use crate::chain::Merge;
use crate::changes::PassWork;

/// What one [`Alerts::run_pass`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Raised alerts merged into a chain.
    pub merged: usize,
    /// Raised alerts dropped without merging.
    pub discarded: usize,
    /// Records, pending alerts and counters removed because their entity
    /// was deleted.
    pub reaped: usize,
    /// Records and counters whose cached parent was refreshed.
    pub reparented: usize,
    /// Whether counters were rebuilt.
    pub aggregated: bool,
}

impl Alerts {
    /// Runs one pass against `store`.
    ///
    /// Raised alerts become visible, state on deleted entities is dropped,
    /// and counters are rebuilt when chains or the hierarchy changed.
    pub fn run_pass<S>(&mut self, store: &mut S) -> PassReport
    where
        S: EntityStore + ?Sized,
    {
        let mut report = PassReport {
            reaped: self.reap(store),
            ..PassReport::default()
        };

        for raised in self.changes.take_pending() {
            match self.merge_unsorted(store, raised) {
                Merge::Discarded => report.discarded += 1,
                Merge::Assigned | Merge::Swapped | Merge::Appended => report.merged += 1,
            }
        }
        self.placeholders.clear();

        report.reparented = self.refresh_cached_parents(&*store);
        if report.reparented > 0 {
            self.changes.request(PassWork::AGGREGATE);
        }

        if self.changes.take_work().contains(PassWork::AGGREGATE) {
            let sources: Vec<CountSource> = self
                .records
                .iter()
                .filter(|&(entity, _)| self.is_head(entity) && store.is_alive(entity))
                .map(|(entity, record)| CountSource {
                    entity,
                    first_parent: record.cached_parent,
                    severity: record.severity(),
                })
                .collect();
            self.aggregator.aggregate(&*store, &sources);
            report.aggregated = true;
        }

        tracing::debug!(?report, "alert pass finished");
        report
    }

    /// Drops state attached to deleted entities. Returns how much went.
    fn reap<S>(&mut self, store: &mut S) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let mut reaped = 0;

        let stale: Vec<EntityId> = self
            .changes
            .pending()
            .iter()
            .copied()
            .filter(|&raised| {
                !store.is_alive(raised)
                    || self
                        .records
                        .get(raised)
                        .and_then(|r| r.next)
                        .is_none_or(|target| !store.is_alive(target))
            })
            .collect();
        for raised in stale {
            tracing::debug!(?raised, "dropping raised alert whose target is gone");
            self.changes.forget_pending(raised);
            self.clear_node(store, raised);
            reaped += 1;
        }

        let dead: Vec<EntityId> = self
            .records
            .keys()
            .filter(|&entity| !self.unsorted.contains(entity) && !store.is_alive(entity))
            .collect();
        let mut predecessors = if dead.iter().any(|&entity| self.chained.contains(entity)) {
            self.predecessors()
        } else {
            HashMap::new()
        };
        for entity in dead {
            if !self.records.contains(entity) {
                // Already went with its head.
                continue;
            }
            if self.chained.contains(entity) {
                self.unlink_dead_node(store, entity, &mut predecessors);
                reaped += 1;
            } else {
                reaped += self.drop_dead_head(store, entity);
            }
        }

        reaped += self.aggregator.reap_dead(&*store);

        if reaped > 0 {
            self.changes.request(PassWork::AGGREGATE);
        }
        reaped
    }

    /// Maps each sorted record's successor back to it.
    fn predecessors(&self) -> HashMap<EntityId, EntityId> {
        self.records
            .iter()
            .filter(|&(owner, _)| !self.unsorted.contains(owner))
            .filter_map(|(owner, record)| record.next.map(|next| (next, owner)))
            .collect()
    }

    /// Splices the chain node on deleted `entity` out of its chain, keeping
    /// `predecessors` current for later splices in the same pass.
    fn unlink_dead_node<S>(
        &mut self,
        store: &mut S,
        entity: EntityId,
        predecessors: &mut HashMap<EntityId, EntityId>,
    ) where
        S: EntityStore + ?Sized,
    {
        let after = self.records.get(entity).and_then(|r| r.next);
        let previous = predecessors.remove(&entity);
        if let Some(previous) = previous
            && let Some(record) = self.records.get_mut(previous)
        {
            record.next = after;
            if let Some(after) = after {
                predecessors.insert(after, previous);
            }
        }
        self.clear_node(store, entity);
        tracing::trace!(?entity, ?previous, "spliced deleted entity out of chain");
    }

    /// Drops the chain headed by deleted `head`, deleting its node entities.
    /// Returns how many records went.
    fn drop_dead_head<S>(&mut self, store: &mut S, head: EntityId) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let nodes: Vec<EntityId> = self.chain(head).skip(1).map(|(node, _)| node).collect();
        for &node in &nodes {
            self.clear_node(store, node);
        }
        self.records.remove(head);
        self.actions.remove(head);
        tracing::trace!(?head, nodes = nodes.len(), "dropped chain of deleted entity");
        nodes.len() + 1
    }

    /// Refreshes cached parents on active records and counters. Returns how
    /// many changed.
    fn refresh_cached_parents<S>(&mut self, store: &S) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let heads: Vec<EntityId> = self
            .records
            .keys()
            .filter(|&entity| self.is_head(entity))
            .collect();
        let mut changed = 0;
        for head in heads {
            let parent = store.parent(head);
            if let Some(record) = self.records.get_mut(head)
                && record.cached_parent != parent
            {
                tracing::trace!(?head, ?parent, "alerting entity was reparented");
                record.cached_parent = parent;
                changed += 1;
            }
        }
        changed + self.aggregator.refresh_cached_parents(store)
    }
}
