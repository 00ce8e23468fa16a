// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Alert records, their actions, and the [`Alert`] descriptor used to raise them.

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use understory_entity::EntityId;

use crate::severity::{Rank, Severity};

/// Callback attached to an alert, invoked with the entity the alert is shown on.
///
/// Cloning shares the underlying closure.
#[derive(Clone)]
pub struct AlertAction(Arc<dyn Fn(EntityId) + Send + Sync>);

impl AlertAction {
    /// Wraps a closure.
    pub fn new(f: impl Fn(EntityId) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the callback for `entity`.
    pub fn invoke(&self, entity: EntityId) {
        (self.0)(entity);
    }

    /// Returns `true` if both handles share the same closure.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AlertAction")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Describes an alert to raise with [`Alerts::add_alert`](crate::Alerts::add_alert).
///
/// # Example
///
/// ```
/// use understory_alert::{Alert, AlertAction, Severity};
///
/// let alert = Alert::error("missing-mesh", "Mesh asset could not be loaded")
///     .with_priority(200)
///     .with_action(AlertAction::new(|_entity| {}));
///
/// assert_eq!(alert.name(), "missing-mesh");
/// assert_eq!(alert.severity(), Severity::Error);
/// assert_eq!(alert.priority(), Some(200));
/// ```
#[derive(Clone, Debug)]
pub struct Alert {
    pub(crate) name: String,
    pub(crate) message: String,
    pub(crate) severity: Severity,
    pub(crate) priority: Option<u8>,
    pub(crate) action: Option<AlertAction>,
}

impl Alert {
    /// Creates an alert with the configured default priority and no action.
    pub fn new(name: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            severity,
            priority: None,
            action: None,
        }
    }

    /// Creates a [`Severity::Warning`] alert.
    pub fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, message, Severity::Warning)
    }

    /// Creates a [`Severity::Error`] alert.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, message, Severity::Error)
    }

    /// Sets the priority within the alert's severity.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches an action.
    #[must_use]
    pub fn with_action(mut self, action: AlertAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Returns the name identifying this alert on its target.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the explicit priority, if one was set.
    #[must_use]
    pub fn priority(&self) -> Option<u8> {
        self.priority
    }
}

/// The exchangeable part of a record. Links stay with the entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AlertContent {
    pub(crate) name: String,
    pub(crate) message: String,
    pub(crate) severity: Severity,
    pub(crate) priority: u8,
}

/// One alert, stored on the entity it occupies.
///
/// The record on a target entity is the active alert for that target. Lower
/// ranked alerts for the same target live on internal chain entities, linked
/// through [`next`](Self::next).
///
/// Records are read-only outside this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertRecord {
    pub(crate) content: AlertContent,
    /// While unsorted: the target entity. Once sorted: the next chain entity.
    pub(crate) next: Option<EntityId>,
    pub(crate) cached_parent: Option<EntityId>,
}

impl AlertRecord {
    pub(crate) fn new(content: AlertContent, next: Option<EntityId>) -> Self {
        Self {
            content,
            next,
            cached_parent: None,
        }
    }

    /// Returns the name identifying this alert on its target.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.content.name
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.content.message
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.content.severity
    }

    /// Returns the priority within the severity.
    #[must_use]
    pub fn priority(&self) -> u8 {
        self.content.priority
    }

    /// Returns the chain ordering key.
    #[must_use]
    pub fn rank(&self) -> Rank {
        Rank::new(self.content.severity, self.content.priority)
    }

    /// Returns the entity holding the next record in the chain, if any.
    #[must_use]
    pub fn next(&self) -> Option<EntityId> {
        self.next
    }

    /// Returns the parent this record's entity had when last observed.
    #[must_use]
    pub fn cached_parent(&self) -> Option<EntityId> {
        self.cached_parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use understory_entity::World;

    #[test]
    fn action_clones_share_closure() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let mut world = World::new();
        let e = world.spawn(None).unwrap();

        let action = AlertAction::new(|_| {
            CALLS.fetch_add(1, Ordering::Relaxed);
        });
        let copy = action.clone();
        assert!(action.ptr_eq(&copy));

        action.invoke(e);
        copy.invoke(e);
        assert_eq!(CALLS.load(Ordering::Relaxed), 2);

        let other = AlertAction::new(|_| {});
        assert!(!action.ptr_eq(&other));
    }

    #[test]
    fn builder_defaults() {
        let alert = Alert::warning("n", "m");
        assert_eq!(alert.severity(), Severity::Warning);
        assert_eq!(alert.priority(), None);
        assert!(alert.action.is_none());
        assert_eq!(alert.message(), "m");
    }
}
