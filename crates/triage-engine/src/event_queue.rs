//! `EventQueue` — pending events ordered by `(due_time, sequence)`.
//!
//! # Ordering
//!
//! Every push is stamped with a monotonically increasing sequence number.
//! The `BTreeMap` key is `(at, seq)`, so the earliest due event pops first
//! and events sharing a due time pop in the order they were scheduled.  That
//! tie-break is what makes a seeded run reproducible event for event.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log E) insert and O(log E) pop where E is the number of
//! pending events.  For the clinic model E stays in the tens: one timeout per
//! in-service patient, one per generator and monitor.

use std::collections::BTreeMap;

use triage_core::{ProcessId, ResourceId, SimTime};

use crate::Signal;

/// Sort key of a scheduled event.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct EventKey {
    pub at:  SimTime,
    pub seq: u64,
}

/// The continuation an event carries.
#[derive(Clone, Debug, PartialEq)]
pub enum Wake {
    /// Resume a suspended process with `signal`.
    ///
    /// `token` must match the process's current token; a mismatch means the
    /// wake-up was superseded (its timeout was cut short by an interrupt) and
    /// the event is dropped.
    Resume {
        process: ProcessId,
        token:   u64,
        signal:  Signal,
    },

    /// Hand freed slots of a resource to its queued requests.
    Allocate(ResourceId),
}

/// A priority queue of pending events.
#[derive(Default)]
pub struct EventQueue {
    inner:    BTreeMap<EventKey, Wake>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `wake` to fire at `at`.  Returns the key it was stored under.
    pub fn push(&mut self, at: SimTime, wake: Wake) -> EventKey {
        let key = EventKey { at, seq: self.next_seq };
        self.next_seq += 1;
        self.inner.insert(key, wake);
        key
    }

    /// Remove and return the earliest event if it is due strictly before
    /// `horizon`.
    pub fn pop_before(&mut self, horizon: SimTime) -> Option<(EventKey, Wake)> {
        let (key, _) = self.inner.first_key_value()?;
        if key.at >= horizon {
            return None;
        }
        self.inner.pop_first()
    }

    /// Due time of the earliest pending event, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().map(|k| k.at)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
