// Copyright 2026 the Mosaic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable deadlines keyed by tile identity.
//!
//! [`TimerQueue`] holds at most one pending deadline per `(key, kind)` pair.
//! Scheduling the same pair again replaces the earlier deadline, which is how
//! a retriggered highlight resets its pulse instead of stacking a second
//! expiry.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::time::HostTime;

/// Which per-tile timer a deadline belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// End of the highlight pulse.
    Highlight,
    /// End of the entry sequence.
    Entry,
}

/// Ordered set of pending deadlines.
#[derive(Clone, Debug)]
pub struct TimerQueue<K: Ord + Clone> {
    by_deadline: BTreeMap<(HostTime, u64), (K, TimerKind)>,
    by_key: BTreeMap<(K, TimerKind), (HostTime, u64)>,
    sequence: u64,
}

impl<K: Ord + Clone> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone> TimerQueue<K> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_deadline: BTreeMap::new(),
            by_key: BTreeMap::new(),
            sequence: 0,
        }
    }

    /// Number of pending deadlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Schedules (or reschedules) the `kind` timer of `key`.
    pub fn schedule(&mut self, key: K, kind: TimerKind, deadline: HostTime) {
        self.cancel(&key, kind);
        let slot = (deadline, self.sequence);
        self.sequence += 1;
        self.by_deadline.insert(slot, (key.clone(), kind));
        self.by_key.insert((key, kind), slot);
    }

    /// Cancels one timer. Returns whether it was pending.
    pub fn cancel(&mut self, key: &K, kind: TimerKind) -> bool {
        match self.by_key.remove(&(key.clone(), kind)) {
            Some(slot) => {
                self.by_deadline.remove(&slot);
                true
            }
            None => false,
        }
    }

    /// Cancels every timer of `key`.
    pub fn cancel_key(&mut self, key: &K) {
        self.cancel(key, TimerKind::Highlight);
        self.cancel(key, TimerKind::Entry);
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.by_deadline.clear();
        self.by_key.clear();
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.by_deadline.keys().next().map(|&(deadline, _)| deadline)
    }

    /// Removes and returns every timer due at or before `now`, earliest
    /// first.
    pub fn pop_due(&mut self, now: HostTime) -> Vec<(K, TimerKind)> {
        let mut due = Vec::new();
        while let Some(entry) = self.by_deadline.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let (key, kind) = entry.remove();
            self.by_key.remove(&(key.clone(), kind));
            due.push((key, kind));
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let mut queue = TimerQueue::new();
        queue.schedule(1_u32, TimerKind::Highlight, HostTime(100));
        queue.schedule(1_u32, TimerKind::Highlight, HostTime(300));

        assert_eq!(queue.len(), 1);
        assert!(queue.pop_due(HostTime(200)).is_empty());
        assert_eq!(
            queue.pop_due(HostTime(300)),
            [(1_u32, TimerKind::Highlight)]
        );
    }

    #[test]
    fn kinds_are_independent() {
        let mut queue = TimerQueue::new();
        queue.schedule(1_u32, TimerKind::Highlight, HostTime(100));
        queue.schedule(1_u32, TimerKind::Entry, HostTime(50));
        assert_eq!(queue.next_deadline(), Some(HostTime(50)));

        assert!(queue.cancel(&1, TimerKind::Entry));
        assert!(!queue.cancel(&1, TimerKind::Entry));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(HostTime(100)));
    }

    #[test]
    fn due_timers_come_out_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(3_u32, TimerKind::Entry, HostTime(30));
        queue.schedule(1_u32, TimerKind::Entry, HostTime(10));
        queue.schedule(2_u32, TimerKind::Entry, HostTime(10));
        queue.schedule(4_u32, TimerKind::Entry, HostTime(99));

        let due = queue.pop_due(HostTime(30));
        let keys: Vec<u32> = due.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, [1, 2, 3]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancel_key_and_clear() {
        let mut queue = TimerQueue::new();
        queue.schedule(1_u32, TimerKind::Highlight, HostTime(1));
        queue.schedule(1_u32, TimerKind::Entry, HostTime(2));
        queue.schedule(2_u32, TimerKind::Entry, HostTime(3));
        queue.cancel_key(&1);
        assert_eq!(queue.len(), 1);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }
}
