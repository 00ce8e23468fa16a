// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Entity: a generational entity arena with sparse attribute columns and parent links.
//!
//! This crate is the storage substrate for subsystems that attach state to
//! arbitrary things in a hierarchy (alerts, annotations, selection marks) without
//! owning the hierarchy themselves.
//!
//! - [`EntityId`]: generational handle; stale ids never alias a live entity.
//! - [`Entities`]: slot allocator with a free list and an optional capacity limit.
//! - [`Column`]: sparse per-entity storage of one attribute type. `Column<()>` is a tag set.
//! - [`Hierarchy`]: parent links and child lists, with configurable [`CycleHandling`].
//! - [`World`]: entities, hierarchy, and resync marks bundled together.
//! - [`EntityStore`]: the narrow interface subsystems consume. Pass it explicitly;
//!   there is no global instance.
//!
//! ## Example
//!
//! ```rust
//! use understory_entity::{Column, EntityStore, World};
//!
//! let mut world = World::new();
//! let root = world.spawn(None).unwrap();
//! let leaf = world.spawn(Some(root)).unwrap();
//!
//! // Subsystems keep their attributes in their own columns.
//! let mut notes = Column::<&str>::new();
//! notes.insert(leaf, "needs review");
//! world.mark_needs_resync(leaf);
//!
//! assert_eq!(world.parent(leaf), Some(root));
//! assert_eq!(notes.get(leaf), Some(&"needs review"));
//! assert!(world.needs_resync(leaf));
//!
//! // Columns do not track liveness; owners clean up after despawn.
//! world.despawn(leaf);
//! assert!(!world.is_alive(leaf));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod column;
mod entities;
mod error;
mod hierarchy;
mod id;
mod store;
mod world;

pub use column::Column;
pub use entities::Entities;
pub use error::EntityError;
pub use hierarchy::{CycleHandling, Hierarchy};
pub use id::EntityId;
pub use store::EntityStore;
pub use world::World;
