//! Flat row types written by output backends.

use triage_model::{RunSummary, Stage, Staff};
use triage_monitor::{ResourceTrace, Sample};

/// One run summary, flattened to a fixed column set.  Absent metrics are
/// empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub run:               usize,
    pub seed:              u64,
    pub horizon:           f64,
    pub arrivals:          usize,
    pub exits:             usize,
    pub preemptions:       u64,
    pub turnaround_median: Option<f64>,
    /// In [`Stage::ALL`] order.
    pub queued:            [Option<f64>; 4],
    /// In [`Stage::ALL`] order.
    pub service:           [Option<f64>; 4],
    /// In [`Staff::ALL`] order.
    pub utilization_event: [Option<f64>; 4],
    /// In [`Staff::ALL`] order.
    pub utilization_poll:  [Option<f64>; 4],
}

impl SummaryRow {
    pub fn new(run: usize, summary: &RunSummary) -> Self {
        let util = |staff: Staff| summary.utilization.get(&staff).copied().unwrap_or_default();
        Self {
            run,
            seed:              summary.seed,
            horizon:           summary.horizon,
            arrivals:          summary.arrivals,
            exits:             summary.exits,
            preemptions:       summary.preemptions,
            turnaround_median: summary.turnaround_median,
            queued:            Stage::ALL.map(|s| summary.queued_median(s)),
            service:           Stage::ALL.map(|s| summary.service_median(s)),
            utilization_event: Staff::ALL.map(|s| util(s).event),
            utilization_poll:  Staff::ALL.map(|s| util(s).poll),
        }
    }

    pub fn header() -> Vec<String> {
        let mut cols: Vec<String> = ["run", "seed", "horizon", "arrivals", "exits", "preemptions", "turnaround_median"]
            .map(String::from)
            .into();
        cols.extend(Stage::ALL.map(|s| format!("queued_{s}")));
        cols.extend(Stage::ALL.map(|s| format!("service_{s}")));
        cols.extend(Staff::ALL.map(|s| format!("utilization_{s}_event")));
        cols.extend(Staff::ALL.map(|s| format!("utilization_{s}_poll")));
        cols
    }

    pub fn record(&self) -> Vec<String> {
        let mut cells = vec![
            self.run.to_string(),
            self.seed.to_string(),
            self.horizon.to_string(),
            self.arrivals.to_string(),
            self.exits.to_string(),
            self.preemptions.to_string(),
            cell(self.turnaround_median),
        ];
        for group in [&self.queued, &self.service, &self.utilization_event, &self.utilization_poll] {
            cells.extend(group.iter().copied().map(cell));
        }
        cells
    }
}

/// One occupancy sample of one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceRow {
    pub run:      usize,
    /// `"event"` or `"poll"`.
    pub monitor:  &'static str,
    pub resource: String,
    pub capacity: usize,
    pub at:       f64,
    pub in_use:   usize,
    pub queued:   usize,
}

impl TraceRow {
    pub const HEADER: [&'static str; 7] =
        ["run", "monitor", "resource", "capacity", "at", "in_use", "queued"];

    pub fn new(run: usize, monitor: &'static str, trace: &ResourceTrace, sample: &Sample) -> Self {
        Self {
            run,
            monitor,
            resource: trace.name().to_owned(),
            capacity: trace.capacity(),
            at:       sample.at.as_f64(),
            in_use:   sample.in_use,
            queued:   sample.queued,
        }
    }

    pub fn record(&self) -> [String; 7] {
        [
            self.run.to_string(),
            self.monitor.to_owned(),
            self.resource.clone(),
            self.capacity.to_string(),
            self.at.to_string(),
            self.in_use.to_string(),
            self.queued.to_string(),
        ]
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
