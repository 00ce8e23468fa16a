// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Alert: prioritized per-entity alert chains with hierarchical child-alert counts.
//!
//! Any entity in a hierarchy can carry any number of named alerts. Exactly one
//! of them is shown (the *active* alert); the rest wait in a chain sorted by
//! rank, so removing the active alert promotes the next one in place. Every
//! ancestor of an alerting entity carries a counter of how many active alerts
//! of each severity sit somewhere below it.
//!
//! - [`Alerts`]: the engine. Lifecycle calls, read accessors, and [`Alerts::run_pass`].
//! - [`Alert`]: what a caller raises: name, message, [`Severity`], priority, optional [`AlertAction`].
//! - [`AlertRecord`]: a stored alert, either active on its target or linked into the chain.
//! - [`ChildAlertCounter`]: per-severity counts on an ancestor.
//! - [`HierarchyAggregator`]: the counter rebuild pipeline, usable on its own.
//! - [`AlertConfig`]: default priority and the hierarchy walk bound.
//!
//! Entity allocation and hierarchy links come from an
//! [`EntityStore`](understory_entity::EntityStore), passed into every call that
//! needs one. [`World`](understory_entity::World) is the bundled store.
//!
//! ## Ordering
//!
//! Alerts compare by [`Rank`]: severity first, then priority. Among equal
//! ranks the most recently raised alert is shown.
//!
//! ## Passes
//!
//! Lifecycle calls take effect immediately on the chains they touch, but newly
//! raised alerts are only merged, and counters only rebuilt, by
//! [`Alerts::run_pass`]. A pass also drops state left on entities that were
//! deleted elsewhere and notices entities that moved in the hierarchy.
//!
//! ## Example
//!
//! ```rust
//! use understory_alert::{Alert, Alerts, Severity};
//! use understory_entity::World;
//!
//! let mut world = World::new();
//! let root = world.spawn(None).unwrap();
//! let child = world.spawn(Some(root)).unwrap();
//! let leaf = world.spawn(Some(child)).unwrap();
//!
//! let mut alerts = Alerts::default();
//! alerts.add_alert(&mut world, leaf, Alert::warning("n1", "low disk").with_priority(100));
//! alerts.add_alert(&mut world, leaf, Alert::error("n2", "offline").with_priority(50));
//!
//! // Nothing is visible until a pass runs.
//! assert!(alerts.active(leaf).is_none());
//! alerts.run_pass(&mut world);
//!
//! // Errors outrank warnings regardless of priority.
//! let names: Vec<_> = alerts.chain(leaf).map(|(_, r)| r.name()).collect();
//! assert_eq!(names, ["n2", "n1"]);
//!
//! // Only the active alert is counted, on every ancestor.
//! assert_eq!(alerts.child_count(child, Severity::Error), 1);
//! assert_eq!(alerts.child_count(root, Severity::Error), 1);
//! assert_eq!(alerts.child_count(root, Severity::Warning), 0);
//!
//! // Removing the active alert promotes the next one.
//! alerts.remove_alert(&mut world, leaf, "n2");
//! alerts.run_pass(&mut world);
//! assert_eq!(alerts.active(leaf).unwrap().name(), "n1");
//! assert_eq!(alerts.child_count(root, Severity::Warning), 1);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod aggregate;
mod alerts;
mod chain;
mod changes;
mod config;
mod counter;
mod lifecycle;
mod pass;
mod record;
mod severity;
mod walk;

pub use aggregate::{CountSource, HierarchyAggregator};
pub use alerts::{Alerts, Chain};
pub use changes::PassWork;
pub use config::{AlertConfig, DEFAULT_MAX_HIERARCHY_DEPTH, DEFAULT_PRIORITY};
pub use counter::ChildAlertCounter;
pub use pass::PassReport;
pub use record::{Alert, AlertAction, AlertRecord};
pub use severity::{Rank, Severity};
pub use walk::WalkError;
