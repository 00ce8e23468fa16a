// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Alerts`] container and its read-only accessors.

use understory_entity::{Column, EntityId};

use crate::aggregate::HierarchyAggregator;
use crate::changes::{ChangeQueue, PassWork};
use crate::config::AlertConfig;
use crate::counter::ChildAlertCounter;
use crate::record::{AlertAction, AlertRecord};
use crate::severity::Severity;

/// Alert chains for every entity, plus child-alert counters for their ancestors.
///
/// `Alerts` owns its attribute columns; entity allocation and hierarchy links
/// come from an [`EntityStore`](understory_entity::EntityStore) passed to
/// each mutating call.
///
/// - Lifecycle: [`add_alert`](Self::add_alert), [`update_alert_text`](Self::update_alert_text),
///   [`update_alert_action`](Self::update_alert_action), [`remove_alert`](Self::remove_alert).
/// - Scheduling: [`run_pass`](Self::run_pass) merges raised alerts, reacts to
///   deleted and reparented entities, and rebuilds counters.
/// - Reading: [`active`](Self::active), [`chain`](Self::chain),
///   [`counter`](Self::counter), [`child_count`](Self::child_count),
///   [`action`](Self::action).
#[derive(Debug)]
pub struct Alerts {
    pub(crate) config: AlertConfig,
    /// Active records on targets, chain records on internal entities, and
    /// unsorted records awaiting a pass.
    pub(crate) records: Column<AlertRecord>,
    pub(crate) actions: Column<AlertAction>,
    /// Records raised but not yet merged. Their `next` is the target.
    pub(crate) unsorted: Column<()>,
    /// Records linked behind a head (internal chain entities).
    pub(crate) chained: Column<()>,
    /// Targets reserved for a record that is still pending.
    pub(crate) placeholders: Column<()>,
    pub(crate) aggregator: HierarchyAggregator,
    pub(crate) changes: ChangeQueue,
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

impl Alerts {
    /// Creates an empty container.
    #[must_use]
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            records: Column::new(),
            actions: Column::new(),
            unsorted: Column::new(),
            chained: Column::new(),
            placeholders: Column::new(),
            aggregator: HierarchyAggregator::new(config.max_hierarchy_depth),
            changes: ChangeQueue::default(),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Returns the active alert on `target`, if any.
    ///
    /// Alerts raised since the last [`run_pass`](Self::run_pass) are not visible yet.
    #[must_use]
    pub fn active(&self, target: EntityId) -> Option<&AlertRecord> {
        if self.is_head(target) {
            self.records.get(target)
        } else {
            None
        }
    }

    /// Iterates over the sorted chain of `target`, active alert first.
    ///
    /// Yields `(entity, record)` pairs; every entity after the first is an
    /// internal chain entity.
    #[must_use]
    pub fn chain(&self, target: EntityId) -> Chain<'_> {
        Chain {
            alerts: self,
            next: self.is_head(target).then_some(target),
            remaining: self.records.len(),
        }
    }

    /// Returns the action paired with the record on `entity`, if any.
    #[must_use]
    pub fn action(&self, entity: EntityId) -> Option<&AlertAction> {
        self.actions.get(entity)
    }

    /// Invokes the action of the active alert on `target`.
    ///
    /// Returns `false` if there is no active alert or it has no action.
    pub fn invoke_action(&self, target: EntityId) -> bool {
        if self.active(target).is_none() {
            return false;
        }
        match self.actions.get(target) {
            Some(action) => {
                action.invoke(target);
                true
            }
            None => false,
        }
    }

    /// Returns the child-alert counter on `entity`, if any.
    #[must_use]
    pub fn counter(&self, entity: EntityId) -> Option<&ChildAlertCounter> {
        self.aggregator.counter(entity)
    }

    /// Returns how many active `severity` alerts sit below `entity`.
    #[must_use]
    pub fn child_count(&self, entity: EntityId, severity: Severity) -> u16 {
        self.counter(entity).map_or(0, |c| c.count(severity))
    }

    /// Returns the aggregator holding the counters.
    #[must_use]
    pub fn aggregator(&self) -> &HierarchyAggregator {
        &self.aggregator
    }

    /// Returns `true` if `target` is reserved for an alert that is still pending.
    #[must_use]
    pub fn has_placeholder(&self, target: EntityId) -> bool {
        self.placeholders.contains(target)
    }

    /// Returns the number of raised alerts not yet merged.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.changes.pending().len()
    }

    /// Returns the number of sorted alerts, active or chained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len() - self.unsorted.len()
    }

    /// Returns `true` if there are no sorted alerts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the work the next [`run_pass`](Self::run_pass) will do.
    #[must_use]
    pub fn pending_work(&self) -> PassWork {
        self.changes.work()
    }

    /// Returns a counter that changes whenever alert state is mutated.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.changes.generation()
    }

    /// `entity` carries an active (sorted, unchained) record.
    pub(crate) fn is_head(&self, entity: EntityId) -> bool {
        self.records.contains(entity)
            && !self.unsorted.contains(entity)
            && !self.chained.contains(entity)
    }

    /// `entity` is an alert entity owned by this container: a chain node or
    /// a raised alert awaiting a pass.
    pub(crate) fn is_internal(&self, entity: EntityId) -> bool {
        self.chained.contains(entity) || self.unsorted.contains(entity)
    }

    /// The sorted successor of `entity`, treating dangling links as absent.
    pub(crate) fn live_next(&self, entity: EntityId) -> Option<EntityId> {
        self.records
            .get(entity)?
            .next
            .filter(|&next| self.records.contains(next) && !self.unsorted.contains(next))
    }
}

/// Iterator over a target's sorted alert chain.
///
/// Created by [`Alerts::chain`]. Stops at a dangling link, and never yields
/// more items than there are records.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    alerts: &'a Alerts,
    next: Option<EntityId>,
    remaining: usize,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (EntityId, &'a AlertRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.next.take()?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let record = self.alerts.records.get(entity)?;
        self.next = self.alerts.live_next(entity);
        Some((entity, record))
    }
}
