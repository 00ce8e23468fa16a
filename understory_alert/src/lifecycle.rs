// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raising, updating, and removing alerts.
//!
//! None of these operations report failure. A dead target, an unknown name,
//! or a store that cannot allocate all turn the call into a no-op, so callers
//! can raise and clear alerts unconditionally.

use alloc::string::String;

use smallvec::SmallVec;
use understory_entity::{EntityId, EntityStore};

use crate::alerts::Alerts;
use crate::changes::PassWork;
use crate::record::{Alert, AlertAction, AlertContent, AlertRecord};

impl Alerts {
    /// Raises `alert` on `target`.
    ///
    /// The alert becomes visible through [`active`](Self::active) and
    /// [`chain`](Self::chain) after the next [`run_pass`](Self::run_pass).
    /// Raising a name that already exists on `target` replaces the old alert.
    pub fn add_alert<S>(&mut self, store: &mut S, target: EntityId, alert: Alert)
    where
        S: EntityStore + ?Sized,
    {
        if !store.is_alive(target) {
            tracing::debug!(?target, name = %alert.name, "not raising alert on dead entity");
            return;
        }
        if self.is_internal(target) {
            tracing::debug!(?target, name = %alert.name, "not raising alert on an alert entity");
            return;
        }

        // Allocate before replacing so a full store leaves the old alert alone.
        let raised = match store.create_entity() {
            Ok(raised) => raised,
            Err(err) => {
                tracing::warn!(%err, ?target, name = %alert.name, "cannot allocate alert entity");
                return;
            }
        };
        self.remove_alert(store, target, &alert.name);

        let content = AlertContent {
            name: alert.name,
            message: alert.message,
            severity: alert.severity,
            priority: alert.priority.unwrap_or(self.config.default_priority),
        };
        self.records
            .insert(raised, AlertRecord::new(content, Some(target)));
        if let Some(action) = alert.action {
            self.actions.insert(raised, action);
        }
        self.unsorted.insert(raised, ());
        if !self.is_head(target) {
            self.placeholders.insert(target, ());
        }
        self.changes.push_pending(raised);
        tracing::trace!(?target, ?raised, "raised alert");
    }

    /// Replaces the message of the alert named `name` in `target`'s chain.
    pub fn update_alert_text<S>(
        &mut self,
        store: &mut S,
        target: EntityId,
        name: &str,
        message: impl Into<String>,
    ) where
        S: EntityStore + ?Sized,
    {
        let Some(owner) = self.find_in_chain(target, name) else {
            tracing::debug!(?target, %name, "no alert to update");
            return;
        };
        if let Some(record) = self.records.get_mut(owner) {
            record.content.message = message.into();
        }
        store.mark_needs_resync(owner);
        self.changes.touch();
    }

    /// Sets or, with `None`, removes the action of the alert named `name` in
    /// `target`'s chain.
    pub fn update_alert_action<S>(
        &mut self,
        store: &mut S,
        target: EntityId,
        name: &str,
        action: Option<AlertAction>,
    ) where
        S: EntityStore + ?Sized,
    {
        let Some(owner) = self.find_in_chain(target, name) else {
            tracing::debug!(?target, %name, "no alert to update");
            return;
        };
        match action {
            Some(action) => {
                self.actions.insert(owner, action);
            }
            None => {
                self.actions.remove(owner);
            }
        }
        store.mark_needs_resync(owner);
        self.changes.touch();
    }

    /// Removes the alert named `name` from `target`.
    ///
    /// Removing the active alert promotes its successor in place. Removing a
    /// chained alert splices it out. Alerts raised since the last pass are
    /// removed before they are ever shown.
    pub fn remove_alert<S>(&mut self, store: &mut S, target: EntityId, name: &str)
    where
        S: EntityStore + ?Sized,
    {
        if self.active(target).is_some_and(|r| r.name() == name) {
            self.promote_successor(store, target);
            store.mark_needs_resync(target);
            self.changes.request(PassWork::AGGREGATE);
            return;
        }

        if self.is_head(target) {
            let mut previous = target;
            for _ in 0..self.records.len() {
                let Some(node) = self.live_next(previous) else {
                    break;
                };
                if self.records.get(node).is_some_and(|r| r.name() == name) {
                    self.splice_out(store, previous, node);
                    store.mark_needs_resync(target);
                    self.changes.request(PassWork::AGGREGATE);
                    return;
                }
                previous = node;
            }
        }

        if self.remove_pending(store, target, name) == 0 {
            tracing::debug!(?target, %name, "no alert to remove");
        }
    }

    /// The first record named `name` in `target`'s sorted chain.
    fn find_in_chain(&self, target: EntityId, name: &str) -> Option<EntityId> {
        self.chain(target)
            .find(|(_, record)| record.name() == name)
            .map(|(entity, _)| entity)
    }

    /// Drops the active alert on `target`, moving its successor (if any) up.
    fn promote_successor<S>(&mut self, store: &mut S, target: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        match self.live_next(target) {
            Some(successor) => {
                self.exchange_contents(target, successor);
                let after = self.records.get(successor).and_then(|r| r.next);
                if let Some(record) = self.records.get_mut(target) {
                    record.next = after;
                }
                self.clear_node(store, successor);
                tracing::trace!(?target, ?successor, "promoted successor alert");
            }
            None => {
                self.records.remove(target);
                self.actions.remove(target);
                tracing::trace!(?target, "removed last alert");
            }
        }
    }

    /// Unlinks `node` from behind `previous` and deletes it.
    fn splice_out<S>(&mut self, store: &mut S, previous: EntityId, node: EntityId)
    where
        S: EntityStore + ?Sized,
    {
        let after = self.records.get(node).and_then(|r| r.next);
        if let Some(record) = self.records.get_mut(previous) {
            record.next = after;
        }
        self.clear_node(store, node);
        tracing::trace!(?previous, ?node, "spliced alert out of chain");
    }

    /// Removes pending alerts for `target` named `name`. Returns how many went.
    fn remove_pending<S>(&mut self, store: &mut S, target: EntityId, name: &str) -> usize
    where
        S: EntityStore + ?Sized,
    {
        let matches: SmallVec<[EntityId; 4]> = self
            .changes
            .pending()
            .iter()
            .copied()
            .filter(|&raised| {
                self.records
                    .get(raised)
                    .is_some_and(|r| r.next == Some(target) && r.name() == name)
            })
            .collect();
        for &raised in &matches {
            self.changes.forget_pending(raised);
            self.clear_node(store, raised);
        }
        if !matches.is_empty() && !self.has_pending_for(target) {
            self.placeholders.remove(target);
        }
        matches.len()
    }

    fn has_pending_for(&self, target: EntityId) -> bool {
        self.changes
            .pending()
            .iter()
            .any(|&raised| self.records.get(raised).is_some_and(|r| r.next == Some(target)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::Severity;
    use alloc::vec::Vec;
    use understory_entity::World;

    fn setup() -> (World, EntityId, Alerts) {
        let mut world = World::new();
        let e = world.spawn(None).unwrap();
        (world, e, Alerts::default())
    }

    fn names(alerts: &Alerts, target: EntityId) -> Vec<&str> {
        alerts.chain(target).map(|(_, r)| r.name()).collect()
    }

    #[test]
    fn default_priority_comes_from_config() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::warning("w", ""));
        alerts.run_pass(&mut world);
        assert_eq!(alerts.active(e).unwrap().priority(), 127);
    }

    #[test]
    fn re_adding_a_name_replaces_it() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::warning("dup", "first"));
        alerts.add_alert(&mut world, e, Alert::error("dup", "second"));
        assert_eq!(alerts.pending_len(), 1);
        alerts.run_pass(&mut world);

        alerts.add_alert(&mut world, e, Alert::warning("dup", "third"));
        alerts.run_pass(&mut world);

        assert_eq!(names(&alerts, e), ["dup"]);
        let active = alerts.active(e).unwrap();
        assert_eq!(active.message(), "third");
        assert_eq!(active.severity(), Severity::Warning);
    }

    #[test]
    fn update_text_reaches_chained_alerts() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::error("top", "a"));
        alerts.add_alert(&mut world, e, Alert::warning("below", "b"));
        alerts.run_pass(&mut world);
        let _ = world.take_resync();

        alerts.update_alert_text(&mut world, e, "below", "changed");
        let (owner, record) = alerts.chain(e).nth(1).unwrap();
        assert_eq!(record.message(), "changed");
        assert!(world.needs_resync(owner));
        assert!(!world.needs_resync(e));
    }

    #[test]
    fn update_ignores_pending_and_unknown_names() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::error("x", "original"));

        alerts.update_alert_text(&mut world, e, "x", "too early");
        alerts.update_alert_text(&mut world, e, "nope", "never");
        alerts.run_pass(&mut world);

        assert_eq!(alerts.active(e).unwrap().message(), "original");
    }

    #[test]
    fn update_action_sets_and_clears() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::error("x", ""));
        alerts.run_pass(&mut world);
        assert!(alerts.action(e).is_none());

        alerts.update_alert_action(&mut world, e, "x", Some(AlertAction::new(|_| {})));
        assert!(alerts.action(e).is_some());
        assert!(alerts.invoke_action(e));

        alerts.update_alert_action(&mut world, e, "x", None);
        assert!(alerts.action(e).is_none());
        assert!(!alerts.invoke_action(e));
    }

    #[test]
    fn promotion_carries_the_successor_action() {
        let (mut world, e, mut alerts) = setup();
        let action = AlertAction::new(|_| {});
        alerts.add_alert(&mut world, e, Alert::error("top", ""));
        alerts.add_alert(
            &mut world,
            e,
            Alert::warning("next", "").with_action(action.clone()),
        );
        alerts.run_pass(&mut world);
        assert!(alerts.action(e).is_none());

        alerts.remove_alert(&mut world, e, "top");
        assert_eq!(alerts.active(e).unwrap().name(), "next");
        assert!(alerts.action(e).unwrap().ptr_eq(&action));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn removing_the_active_alert_drops_its_action() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(
            &mut world,
            e,
            Alert::error("top", "").with_action(AlertAction::new(|_| {})),
        );
        alerts.add_alert(&mut world, e, Alert::warning("next", ""));
        alerts.run_pass(&mut world);
        assert!(alerts.action(e).is_some());

        alerts.remove_alert(&mut world, e, "top");
        assert!(alerts.action(e).is_none());
    }

    #[test]
    fn removing_from_the_middle_splices() {
        let (mut world, e, mut alerts) = setup();
        for (name, priority) in [("a", 30), ("b", 20), ("c", 10)] {
            alerts.add_alert(&mut world, e, Alert::warning(name, "").with_priority(priority));
        }
        alerts.run_pass(&mut world);
        assert_eq!(world.len(), 3);

        alerts.remove_alert(&mut world, e, "b");
        assert_eq!(names(&alerts, e), ["a", "c"]);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn removing_a_pending_alert_clears_the_placeholder() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::warning("x", ""));
        assert!(alerts.has_placeholder(e));

        alerts.remove_alert(&mut world, e, "x");
        assert!(!alerts.has_placeholder(e));
        assert_eq!(alerts.pending_len(), 0);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn allocation_failure_is_a_no_op() {
        let mut world = World::with_entity_limit(1);
        let e = world.spawn(None).unwrap();
        let mut alerts = Alerts::default();

        alerts.add_alert(&mut world, e, Alert::error("x", ""));
        assert_eq!(alerts.pending_len(), 0);
        assert!(!alerts.has_placeholder(e));

        let report = alerts.run_pass(&mut world);
        assert!(!report.aggregated);
        assert!(alerts.active(e).is_none());
    }

    #[test]
    fn failed_replacement_keeps_the_old_alert() {
        let mut world = World::with_entity_limit(2);
        let e = world.spawn(None).unwrap();
        let mut alerts = Alerts::default();

        alerts.add_alert(&mut world, e, Alert::warning("x", "old"));
        alerts.run_pass(&mut world);
        let _filler = world.spawn(None).unwrap();

        alerts.add_alert(&mut world, e, Alert::error("x", "new"));
        assert_eq!(alerts.active(e).unwrap().message(), "old");
        assert_eq!(alerts.pending_len(), 0);

        alerts.run_pass(&mut world);
        assert_eq!(alerts.active(e).unwrap().message(), "old");
    }

    #[test]
    fn alert_entities_are_not_targets() {
        let (mut world, e, mut alerts) = setup();
        alerts.add_alert(&mut world, e, Alert::error("a", ""));
        alerts.add_alert(&mut world, e, Alert::warning("b", ""));
        let pending = alerts.changes.pending()[0];

        alerts.add_alert(&mut world, pending, Alert::error("on-pending", ""));
        assert_eq!(alerts.pending_len(), 2);
        alerts.run_pass(&mut world);

        let node = alerts.chain(e).nth(1).unwrap().0;
        alerts.add_alert(&mut world, node, Alert::error("on-node", ""));
        assert_eq!(alerts.pending_len(), 0);
        assert!(!alerts.has_placeholder(node));

        alerts.run_pass(&mut world);
        assert_eq!(names(&alerts, e), ["a", "b"]);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn dead_target_is_a_no_op() {
        let (mut world, e, mut alerts) = setup();
        world.despawn(e);

        alerts.add_alert(&mut world, e, Alert::error("x", ""));
        alerts.update_alert_text(&mut world, e, "x", "");
        alerts.remove_alert(&mut world, e, "x");

        assert_eq!(alerts.pending_len(), 0);
        assert!(world.is_empty());
    }
}
