//! Occupancy samples and per-resource traces.

use std::cell::RefCell;
use std::rc::Rc;

use triage_core::{ResourceId, SimTime};
use triage_engine::{Resource, ResourcePool, ResourceSnapshot};

/// One observation of a resource.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub at:     SimTime,
    /// Slots allocated.
    pub in_use: usize,
    /// Requests waiting.
    pub queued: usize,
}

impl From<&ResourceSnapshot> for Sample {
    fn from(s: &ResourceSnapshot) -> Self {
        Sample { at: s.at, in_use: s.in_use, queued: s.queued }
    }
}

/// Time-ordered samples of a single resource.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceTrace {
    resource: ResourceId,
    name:     String,
    capacity: usize,
    samples:  Vec<Sample>,
}

/// A trace written by a listener or process while the run executes and read
/// by the run controller afterwards.  Runs are single-threaded.
pub type SharedTrace = Rc<RefCell<ResourceTrace>>;

impl ResourceTrace {
    pub fn new(resource: ResourceId, name: impl Into<String>, capacity: usize) -> Self {
        Self { resource, name: name.into(), capacity, samples: Vec::new() }
    }

    /// An empty trace labelled after `resource`.
    pub fn for_resource(resource: &Resource) -> Self {
        Self::new(resource.id(), resource.name(), resource.capacity())
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the latest sample.
    pub fn last_time(&self) -> Option<SimTime> {
        self.samples.last().map(|s| s.at)
    }

    /// Highest occupancy observed, 0 for an empty trace.
    pub fn max_in_use(&self) -> usize {
        self.samples.iter().map(|s| s.in_use).max().unwrap_or(0)
    }

    /// Append a sample.
    ///
    /// # Panics
    /// Panics in debug mode if `sample` is older than the latest one.
    pub fn push(&mut self, sample: Sample) {
        debug_assert!(
            self.last_time().is_none_or(|last| last <= sample.at),
            "trace {:?} sample at {} precedes {:?}",
            self.name,
            sample.at,
            self.last_time(),
        );
        self.samples.push(sample);
    }

    /// Correct the latest sample after a queued request was handed a slot.
    ///
    /// The post-release sample counts the freed slot as idle and the
    /// grantee as still queued.  If that sample was taken at `at`, still
    /// shows a waiting request and has a slot to spare, it is amended in
    /// place: one more slot in use, one fewer request queued.  Returns
    /// whether the sample changed.
    pub fn amend_after_grant(&mut self, at: SimTime) -> bool {
        let capacity = self.capacity;
        match self.samples.last_mut() {
            Some(last) if last.at == at && last.queued > 0 && last.in_use < capacity => {
                last.in_use += 1;
                last.queued -= 1;
                true
            }
            _ => false,
        }
    }

    /// Extend a non-empty trace to `snapshot.at` with the state it holds.
    /// Does nothing on an empty trace or if the trace already reaches that
    /// instant.
    pub fn close_with(&mut self, snapshot: &ResourceSnapshot) {
        if self.last_time().is_some_and(|last| last < snapshot.at) {
            self.samples.push(Sample::from(snapshot));
        }
    }
}

/// Copy the current contents of shared traces.
pub fn snapshot_all(traces: &[SharedTrace]) -> Vec<ResourceTrace> {
    traces.iter().map(|t| t.borrow().clone()).collect()
}

// ── MonitorTraces ─────────────────────────────────────────────────────────────

/// Raw traces of one run, as captured by each monitor that was active.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorTraces {
    /// One trace per resource from the event-driven monitor, or empty.
    pub event: Vec<ResourceTrace>,
    /// One trace per resource from the poll-driven monitor, or empty.
    pub poll:  Vec<ResourceTrace>,
}

impl MonitorTraces {
    /// Close every non-empty trace at `at` with the final state of its
    /// resource in `pool`.
    pub fn close_at(&mut self, at: SimTime, pool: &ResourcePool) {
        for trace in self.event.iter_mut().chain(self.poll.iter_mut()) {
            if let Some(resource) = pool.get(trace.resource()) {
                trace.close_with(&resource.snapshot(at));
            }
        }
    }

    pub fn event_for(&self, resource: ResourceId) -> Option<&ResourceTrace> {
        self.event.iter().find(|t| t.resource() == resource)
    }

    pub fn poll_for(&self, resource: ResourceId) -> Option<&ResourceTrace> {
        self.poll.iter().find(|t| t.resource() == resource)
    }

    /// All traces, event-driven first.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceTrace> {
        self.event.iter().chain(self.poll.iter())
    }
}
