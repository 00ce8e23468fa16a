// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-ancestor counts of alerts below an entity.

use understory_entity::EntityId;

use crate::severity::Severity;

/// Number of active alerts, per severity, in the subtree below an entity.
///
/// The entity's own alert is not included. Counters are created and removed
/// by [`HierarchyAggregator`](crate::HierarchyAggregator) only: an entity has a
/// counter exactly while some descendant carries an alert.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildAlertCounter {
    counts: [u16; Severity::COUNT],
    cached_parent: Option<EntityId>,
}

impl ChildAlertCounter {
    pub(crate) fn new(cached_parent: Option<EntityId>) -> Self {
        Self {
            counts: [0; Severity::COUNT],
            cached_parent,
        }
    }

    /// Returns the number of descendant alerts with `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> u16 {
        self.counts[severity.index()]
    }

    /// Returns all counts, indexed by [`Severity::index`].
    #[must_use]
    pub fn counts(&self) -> [u16; Severity::COUNT] {
        self.counts
    }

    /// Returns the number of descendant alerts of any severity.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }

    /// Returns `true` if every count is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Returns the parent this counter's entity had when last observed.
    #[must_use]
    pub fn cached_parent(&self) -> Option<EntityId> {
        self.cached_parent
    }

    pub(crate) fn set_cached_parent(&mut self, parent: Option<EntityId>) {
        self.cached_parent = parent;
    }

    pub(crate) fn reset(&mut self) {
        self.counts = [0; Severity::COUNT];
    }

    /// Saturates at `u16::MAX`.
    pub(crate) fn increment(&mut self, severity: Severity) {
        let slot = &mut self.counts[severity.index()];
        *slot = slot.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_reset_and_totals() {
        let mut counter = ChildAlertCounter::new(None);
        assert!(counter.is_empty());

        counter.increment(Severity::Error);
        counter.increment(Severity::Error);
        counter.increment(Severity::Warning);
        assert_eq!(counter.count(Severity::Error), 2);
        assert_eq!(counter.count(Severity::Warning), 1);
        assert_eq!(counter.total(), 3);

        counter.reset();
        assert!(counter.is_empty());
    }

    #[test]
    fn counts_saturate() {
        let mut counter = ChildAlertCounter::new(None);
        counter.counts[Severity::Warning.index()] = u16::MAX;
        counter.increment(Severity::Warning);
        assert_eq!(counter.count(Severity::Warning), u16::MAX);
    }
}
