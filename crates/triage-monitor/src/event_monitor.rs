//! Event-driven monitor: samples at every resource operation boundary.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;
use triage_engine::{Grant, Resource, ResourceListener, ResourceSnapshot};

use crate::trace::{ResourceTrace, SharedTrace, snapshot_all};

/// Records a sample after every request and release on the resources it is
/// attached to, and amends the latest sample when a queued request is
/// handed a slot.
#[derive(Default)]
pub struct EventMonitor {
    traces: Vec<SharedTrace>,
}

impl EventMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording `resource`.  Each resource should be attached once.
    pub fn attach(&mut self, resource: &mut Resource) {
        let trace = Rc::new(RefCell::new(ResourceTrace::for_resource(resource)));
        resource.subscribe(Box::new(Recorder { trace: Rc::clone(&trace) }));
        self.traces.push(trace);
    }

    /// Copies of the traces recorded so far, in attach order.
    pub fn traces(&self) -> Vec<ResourceTrace> {
        snapshot_all(&self.traces)
    }
}

/// The listener installed on each monitored resource.
struct Recorder {
    trace: SharedTrace,
}

impl ResourceListener for Recorder {
    fn on_request(&mut self, snapshot: &ResourceSnapshot) {
        self.trace.borrow_mut().push(snapshot.into());
    }

    fn on_release(&mut self, snapshot: &ResourceSnapshot) {
        self.trace.borrow_mut().push(snapshot.into());
    }

    fn on_grant(&mut self, snapshot: &ResourceSnapshot, grant: &Grant) {
        if self.trace.borrow_mut().amend_after_grant(snapshot.at) {
            trace!(resource = %grant.resource, process = %grant.process, "sample amended after hand-over");
        }
    }
}
