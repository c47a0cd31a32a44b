//! Reduction of a run's accumulators and traces into summary metrics.

use std::collections::BTreeMap;

use triage_monitor::{Interpolation, MonitorTraces, utilization};

use crate::{ClinicConfig, RunAccumulators, Stage, Staff, StaffIds};

/// Median of `samples`; the mean of the two middle values for an even count.
/// `None` when there are no samples.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some(0.5 * (sorted[mid - 1] + sorted[mid]))
    }
}

/// Utilization of one staff pool according to each active monitor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utilization {
    /// From the event-driven trace (exact occupancy integral).
    pub event: Option<f64>,
    /// From the poll-driven trace (trapezoids between ticks).
    pub poll:  Option<f64>,
}

impl Utilization {
    /// The preferred estimate: event-driven if available, else poll-driven.
    pub fn ratio(&self) -> Option<f64> {
        self.event.or(self.poll)
    }
}

/// The result of one run.  Metrics without samples are absent, never zero.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub seed:              u64,
    pub horizon:           f64,
    /// Median wait per stage.
    pub queued:            BTreeMap<Stage, f64>,
    /// Median service time per stage.
    pub service:           BTreeMap<Stage, f64>,
    pub turnaround_median: Option<f64>,
    pub utilization:       BTreeMap<Staff, Utilization>,
    pub arrivals:          usize,
    pub exits:             usize,
    pub preemptions:       u64,
}

impl RunSummary {
    /// Reduce the outputs of a finished run.
    pub fn reduce(
        config:       &ClinicConfig,
        accumulators: &RunAccumulators,
        traces:       &MonitorTraces,
        staff:        &StaffIds,
    ) -> Self {
        let per_stage = |samples: &BTreeMap<Stage, Vec<f64>>| {
            samples
                .iter()
                .filter_map(|(&stage, xs)| median(xs).map(|m| (stage, m)))
                .collect::<BTreeMap<_, _>>()
        };

        let utilization = staff
            .iter()
            .filter_map(|(who, id)| {
                let u = Utilization {
                    event: traces.event_for(id).and_then(|t| utilization(t, Interpolation::Hold)),
                    poll:  traces.poll_for(id).and_then(|t| utilization(t, Interpolation::Linear)),
                };
                u.ratio().map(|_| (who, u))
            })
            .collect();

        Self {
            seed:              config.seed,
            horizon:           config.horizon,
            queued:            per_stage(&accumulators.queued),
            service:           per_stage(&accumulators.service),
            turnaround_median: median(&accumulators.turnaround),
            utilization,
            arrivals:          accumulators.arrivals.len(),
            exits:             accumulators.exits(),
            preemptions:       accumulators.preemptions,
        }
    }

    pub fn queued_median(&self, stage: Stage) -> Option<f64> {
        self.queued.get(&stage).copied()
    }

    pub fn service_median(&self, stage: Stage) -> Option<f64> {
        self.service.get(&stage).copied()
    }

    /// Preferred utilization ratio of `staff`.
    pub fn utilization_of(&self, staff: Staff) -> Option<f64> {
        self.utilization.get(&staff).and_then(Utilization::ratio)
    }
}
