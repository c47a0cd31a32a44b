//! `triage-monitor` — resource occupancy traces and utilization.
//!
//! Two independent strategies record `(at, in_use, queued)` samples:
//!
//! | Strategy       | Type             | Samples taken                               |
//! |----------------|------------------|---------------------------------------------|
//! | event-driven   | [`EventMonitor`] | after every request and release, amended on grant |
//! | poll-driven    | [`PollMonitor`]  | every `period` time units, one per resource |
//!
//! Both fill [`ResourceTrace`]s, which [`utilization`] reduces to an
//! occupancy ratio.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut kernel = Kernel::new(world);
//! let desk = kernel.add_resource("desk", 1, Discipline::Fifo)?;
//!
//! let mut events = EventMonitor::new();
//! events.attach(kernel.resource_mut(desk));
//!
//! let polls = PollMonitor::new(0.25, kernel.resources().iter())?;
//! let handles = polls.handles();
//! kernel.spawn(polls);
//!
//! kernel.run_until(horizon);
//! let mut traces = MonitorTraces { event: events.traces(), poll: snapshot_all(&handles) };
//! traces.close_at(horizon, kernel.resources());
//! ```

pub mod error;
pub mod event_monitor;
pub mod poll_monitor;
pub mod trace;
pub mod utilization;

#[cfg(test)]
mod tests;

pub use error::{MonitorError, MonitorResult};
pub use event_monitor::EventMonitor;
pub use poll_monitor::PollMonitor;
pub use trace::{MonitorTraces, ResourceTrace, Sample, SharedTrace, snapshot_all};
pub use utilization::{Interpolation, occupancy_integral, utilization};
