//! Resource listeners — synchronous callbacks on state-mutating operations.

use triage_core::{ResourceId, SimTime};

use crate::Grant;

/// Observable state of a resource right after an operation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceSnapshot {
    pub resource: ResourceId,
    pub at:       SimTime,
    /// Slots currently allocated.
    pub in_use:   usize,
    /// Requests waiting for a slot.
    pub queued:   usize,
    pub capacity: usize,
}

/// Callbacks a [`Resource`](crate::Resource) invokes synchronously.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Call order
///
/// - `on_request` fires after every admission call has been processed
///   (granted, queued or preempting).
/// - `on_release` fires after a slot was freed.  A queued request that will
///   take over the slot has **not** been allocated yet: that happens in a
///   zero-delay event at the same instant.
/// - `on_grant` fires exactly once per grant, directly after the slot was
///   allocated and before the owning process resumes.
pub trait ResourceListener {
    fn on_request(&mut self, _snapshot: &ResourceSnapshot) {}

    fn on_release(&mut self, _snapshot: &ResourceSnapshot) {}

    fn on_grant(&mut self, _snapshot: &ResourceSnapshot, _grant: &Grant) {}
}
