//! Run-scoped sample accumulators.
//!
//! One `RunAccumulators` is the world state of one run's kernel.  Every
//! process of the run writes into it through its `Context`; nothing is shared
//! between runs.

use std::collections::BTreeMap;

use triage_core::{EntityId, SimTime};
use triage_engine::Priority;

use crate::Stage;

/// What one patient experienced at one stage.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageVisit {
    pub stage:       Stage,
    /// Total time spent waiting for the stage's resource, requeues after a
    /// preemption included.
    pub queued:      f64,
    /// Total time spent holding the resource.
    pub service:     f64,
    pub preemptions: u32,
}

impl StageVisit {
    pub fn new(stage: Stage) -> Self {
        Self { stage, queued: 0.0, service: 0.0, preemptions: 0 }
    }
}

/// The full record of a patient that exited.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Journey {
    pub patient:    EntityId,
    pub arrived_at: SimTime,
    pub exited_at:  SimTime,
    pub acuity:     Option<Priority>,
    /// Priority at exit.
    pub priority:   Option<Priority>,
    pub visits:     Vec<StageVisit>,
}

impl Journey {
    pub fn turnaround(&self) -> f64 {
        self.exited_at.since(self.arrived_at)
    }

    /// Σ queued + Σ service over all visits.
    pub fn accounted(&self) -> f64 {
        self.visits.iter().map(|v| v.queued + v.service).sum()
    }

    pub fn final_stage(&self) -> Option<Stage> {
        self.visits.last().map(|v| v.stage)
    }
}

/// Observed durations of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunAccumulators {
    /// Arrival instant of every patient, in arrival order.
    pub arrivals:    Vec<SimTime>,
    /// Wait from entering a stage's queue until service first starts.
    pub queued:      BTreeMap<Stage, Vec<f64>>,
    /// Total service time of every completed stage.
    pub service:     BTreeMap<Stage, Vec<f64>>,
    /// Arrival-to-exit time of every exited patient.
    pub turnaround:  Vec<f64>,
    pub journeys:    Vec<Journey>,
    pub preemptions: u64,
}

impl RunAccumulators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arrival(&mut self, at: SimTime) {
        self.arrivals.push(at);
    }

    pub fn record_queued(&mut self, stage: Stage, wait: f64) {
        self.queued.entry(stage).or_default().push(wait);
    }

    pub fn record_service(&mut self, stage: Stage, duration: f64) {
        self.service.entry(stage).or_default().push(duration);
    }

    pub fn record_preemption(&mut self) {
        self.preemptions += 1;
    }

    /// Record a patient's exit.
    pub fn record_exit(&mut self, journey: Journey) {
        self.turnaround.push(journey.turnaround());
        self.journeys.push(journey);
    }

    pub fn queued_for(&self, stage: Stage) -> &[f64] {
        self.queued.get(&stage).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn service_for(&self, stage: Stage) -> &[f64] {
        self.service.get(&stage).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn exits(&self) -> usize {
        self.turnaround.len()
    }
}
