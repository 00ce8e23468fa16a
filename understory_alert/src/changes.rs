// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change queue drained once per pass.

use alloc::vec::Vec;
use core::mem;

use understory_entity::EntityId;

bitflags::bitflags! {
    /// Work requested for the next [`Alerts::run_pass`](crate::Alerts::run_pass).
    ///
    /// Requests coalesce: however many mutations ask for aggregation between
    /// two passes, it runs once.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PassWork: u8 {
        /// Raised alerts are waiting to be merged into their chains.
        const SORT      = 0b0000_0001;
        /// Chain heads or the hierarchy changed; counters must be rebuilt.
        const AGGREGATE = 0b0000_0010;
    }
}

/// Pending work plus the raised-but-unsorted alerts, in raise order.
///
/// A generation counter increments on every mutation so hosts can tell
/// whether anything happened since they last looked.
#[derive(Debug)]
pub(crate) struct ChangeQueue {
    work: PassWork,
    pending: Vec<EntityId>,
    generation: u64,
}

impl Default for ChangeQueue {
    fn default() -> Self {
        Self {
            work: PassWork::empty(),
            pending: Vec::new(),
            generation: 0,
        }
    }
}

impl ChangeQueue {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn work(&self) -> PassWork {
        self.work
    }

    /// Records a mutation that needs no pass work.
    pub(crate) fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn request(&mut self, work: PassWork) {
        self.touch();
        self.work |= work;
    }

    pub(crate) fn push_pending(&mut self, entity: EntityId) {
        self.pending.push(entity);
        self.request(PassWork::SORT);
    }

    /// Drops `entity` from the pending list. Returns `true` if it was there.
    pub(crate) fn forget_pending(&mut self, entity: EntityId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|&e| e != entity);
        if self.pending.len() == before {
            return false;
        }
        self.touch();
        if self.pending.is_empty() {
            self.work.remove(PassWork::SORT);
        }
        true
    }

    pub(crate) fn pending(&self) -> &[EntityId] {
        &self.pending
    }

    /// Takes the pending alerts, clearing [`PassWork::SORT`].
    pub(crate) fn take_pending(&mut self) -> Vec<EntityId> {
        self.touch();
        self.work.remove(PassWork::SORT);
        mem::take(&mut self.pending)
    }

    /// Takes the remaining requested work.
    pub(crate) fn take_work(&mut self) -> PassWork {
        self.touch();
        mem::replace(&mut self.work, PassWork::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_entity::World;

    #[test]
    fn requests_coalesce() {
        let mut queue = ChangeQueue::default();
        queue.request(PassWork::AGGREGATE);
        queue.request(PassWork::AGGREGATE);
        assert_eq!(queue.work(), PassWork::AGGREGATE);
        assert_eq!(queue.take_work(), PassWork::AGGREGATE);
        assert!(queue.work().is_empty());
    }

    #[test]
    fn pending_keeps_raise_order() {
        let mut world = World::new();
        let ids: Vec<_> = (0..3).map(|_| world.spawn(None).unwrap()).collect();

        let mut queue = ChangeQueue::default();
        for &id in &ids {
            queue.push_pending(id);
        }
        assert!(queue.work().contains(PassWork::SORT));

        assert!(queue.forget_pending(ids[1]));
        assert!(!queue.forget_pending(ids[1]));
        assert_eq!(queue.pending(), &[ids[0], ids[2]]);

        assert_eq!(queue.take_pending(), [ids[0], ids[2]]);
        assert!(queue.pending().is_empty());
        assert!(!queue.work().contains(PassWork::SORT));
    }

    #[test]
    fn forgetting_last_pending_clears_sort() {
        let mut world = World::new();
        let id = world.spawn(None).unwrap();

        let mut queue = ChangeQueue::default();
        queue.push_pending(id);
        queue.forget_pending(id);
        assert!(queue.work().is_empty());
    }

    #[test]
    fn generation_increments() {
        let mut queue = ChangeQueue::default();
        let initial = queue.generation();
        queue.request(PassWork::AGGREGATE);
        assert_eq!(queue.generation(), initial + 1);
        let _ = queue.take_work();
        assert_eq!(queue.generation(), initial + 2);
    }

    #[test]
    fn touch_bumps_generation_without_work() {
        let mut queue = ChangeQueue::default();
        let initial = queue.generation();
        queue.touch();
        assert_eq!(queue.generation(), initial + 1);
        assert!(queue.work().is_empty());
    }
}
