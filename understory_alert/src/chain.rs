// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chain mutation primitives and the merge of raised alerts into sorted chains.
//!
//! A chain is a singly linked list threaded through entities: the target
//! entity holds the highest ranked record, and each record's `next` names the
//! entity holding the following one. Moving an alert between positions never
//! relinks the target; instead record contents are exchanged between entities
//! and only the `next` links of the entities involved are rewritten.

use core::mem;

use understory_entity::{EntityId, EntityStore};

use crate::alerts::Alerts;
use crate::changes::PassWork;
use crate::record::{AlertContent, AlertRecord};

/// How a raised alert ended up after [`Alerts::merge_unsorted`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Merge {
    /// Filled an empty target.
    Assigned,
    /// Took the place of an equal or lower ranked record.
    Swapped,
    /// Went to the end of the chain.
    Appended,
    /// Dropped: stale, target gone, or the chain is corrupt.
    Discarded,
}

impl Alerts {
    /// Swaps content and action between the records on `a` and `b`.
    ///
    /// `next` and `cached_parent` stay with their entities.
    pub(crate) fn exchange_contents(&mut self, a: EntityId, b: EntityId) {
        if a == b || !self.records.contains(b) {
            return;
        }
        let Some(mut record_a) = self.records.remove(a) else {
            return;
        };
        if let Some(record_b) = self.records.get_mut(b) {
            mem::swap(&mut record_a.content, &mut record_b.content);
        }
        self.records.insert(a, record_a);

        let action_a = self.actions.remove(a);
        let action_b = self.actions.remove(b);
        if let Some(action) = action_b {
            self.actions.insert(a, action);
        }
        if let Some(action) = action_a {
            self.actions.insert(b, action);
        }
    }

    /// Drops every attribute on an internal alert entity and deletes it.
    pub(crate) fn clear_node<S>(&mut self, store: &mut S, entity: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        self.records.remove(entity);
        self.actions.remove(entity);
        self.unsorted.remove(entity);
        self.chained.remove(entity);
        store.delete_entity(entity);
    }

    /// Moves the raised alert on `raised` into the empty `target`.
    fn assign_into<S>(&mut self, store: &mut S, target: EntityId, raised: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        let mut slot = AlertRecord::new(AlertContent::default(), None);
        slot.cached_parent = store.parent(target);
        self.records.insert(target, slot);
        self.exchange_contents(target, raised);
        self.clear_node(store, raised);
        self.placeholders.remove(target);

        tracing::trace!(?target, ?raised, "assigned alert into empty target");
        store.mark_needs_resync(target);
        self.changes.request(PassWork::AGGREGATE);
    }

    /// Puts the raised alert in `node`'s position and pushes `node`'s old
    /// record one step down, onto the `raised` entity.
    fn swap_and_chain<S>(&mut self, store: &mut S, node: EntityId, raised: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        self.exchange_contents(node, raised);
        let after = self.records.get(node).and_then(|r| r.next);
        if let Some(record) = self.records.get_mut(raised) {
            record.next = after;
            record.cached_parent = None;
        }
        if let Some(record) = self.records.get_mut(node) {
            record.next = Some(raised);
        }
        self.unsorted.remove(raised);
        self.chained.insert(raised, ());

        tracing::trace!(?node, ?raised, "raised alert took the place of a lower one");
        store.mark_needs_resync(node);
        store.mark_needs_resync(raised);
        self.changes.request(PassWork::AGGREGATE);
    }

    /// Links the raised alert after `tail`.
    fn append<S>(&mut self, store: &mut S, tail: EntityId, raised: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        if let Some(record) = self.records.get_mut(tail) {
            record.next = Some(raised);
        }
        if let Some(record) = self.records.get_mut(raised) {
            record.next = None;
            record.cached_parent = None;
        }
        self.unsorted.remove(raised);
        self.chained.insert(raised, ());

        tracing::trace!(?tail, ?raised, "appended alert to chain");
        store.mark_needs_resync(raised);
        self.changes.request(PassWork::AGGREGATE);
    }

    /// Drops a pending alert without merging it.
    fn discard<S>(&mut self, store: &mut S, raised: EntityId) -> Merge
    where
        S: EntityStore + ?Sized,
    {
        self.changes.forget_pending(raised);
        self.clear_node(store, raised);
        Merge::Discarded
    }

    /// Merges the unsorted alert on `raised` into its target's chain.
    ///
    /// Walks from the target towards the tail and stops at the first record
    /// that ranks lower than or equal to the raised one; the raised alert
    /// takes that position. Ties go to the raised alert, so the most recently
    /// raised of equally ranked alerts is shown.
    pub(crate) fn merge_unsorted<S>(&mut self, store: &mut S, raised: EntityId) -> Merge
    where
        S: EntityStore + ?Sized,
    {
        if !self.unsorted.contains(raised) {
            return Merge::Discarded;
        }
        let Some((target, rank)) = self
            .records
            .get(raised)
            .and_then(|r| r.next.map(|target| (target, r.rank())))
        else {
            return self.discard(store, raised);
        };
        if !store.is_alive(target) {
            tracing::debug!(?target, ?raised, "target gone before alert was merged");
            return self.discard(store, raised);
        }
        if self.is_internal(target) {
            tracing::debug!(?target, ?raised, "alert raised on an alert entity");
            return self.discard(store, raised);
        }
        if !self.is_head(target) {
            self.assign_into(store, target, raised);
            return Merge::Assigned;
        }

        let limit = self.records.len();
        let mut node = target;
        for _ in 0..=limit {
            let outranked = self
                .records
                .get(node)
                .is_none_or(|record| rank >= record.rank());
            if outranked {
                self.swap_and_chain(store, node, raised);
                return Merge::Swapped;
            }
            match self.live_next(node) {
                Some(next) => node = next,
                None => {
                    self.append(store, node, raised);
                    return Merge::Appended;
                }
            }
        }

        tracing::warn!(?target, ?raised, "alert chain does not terminate; dropping raised alert");
        self.discard(store, raised)
    }
}
