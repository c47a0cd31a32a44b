//! Poll-driven monitor: samples every resource at a fixed period.

use std::cell::RefCell;
use std::rc::Rc;

use triage_engine::{Context, Process, Resource, Signal, Step};

use crate::trace::{ResourceTrace, SharedTrace, snapshot_all};
use crate::{MonitorError, MonitorResult};

/// A process that wakes every `period` time units, starting at the instant
/// it is spawned, and appends one sample per watched resource whether or not
/// its state changed.
pub struct PollMonitor {
    period: f64,
    traces: Vec<SharedTrace>,
}

impl PollMonitor {
    /// Watch `resources` every `period` time units.
    pub fn new<'r>(
        period:    f64,
        resources: impl IntoIterator<Item = &'r Resource>,
    ) -> MonitorResult<Self> {
        if !(period > 0.0 && period.is_finite()) {
            return Err(MonitorError::InvalidPeriod(period));
        }
        let traces = resources
            .into_iter()
            .map(|r| Rc::new(RefCell::new(ResourceTrace::for_resource(r))))
            .collect();
        Ok(Self { period, traces })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Handles to the traces, to keep after the monitor is moved into a
    /// kernel.
    pub fn handles(&self) -> Vec<SharedTrace> {
        self.traces.iter().map(Rc::clone).collect()
    }

    /// Copies of the traces recorded so far.
    pub fn traces(&self) -> Vec<ResourceTrace> {
        snapshot_all(&self.traces)
    }
}

impl<W> Process<W> for PollMonitor {
    fn resume(&mut self, signal: Signal, ctx: &mut Context<'_, W>) -> Step {
        match signal {
            Signal::Start | Signal::Timeout => {
                let now = ctx.now();
                for trace in &self.traces {
                    let mut trace = trace.borrow_mut();
                    let sample = ctx.resource(trace.resource()).snapshot(now);
                    trace.push((&sample).into());
                }
                Step::Hold(self.period)
            }
            Signal::Granted(_) | Signal::Interrupted(_) => {
                unreachable!("poll monitor never requests a resource")
            }
        }
    }
}
