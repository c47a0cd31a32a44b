//! `ClinicRun` — the run controller.

use std::rc::Rc;

use tracing::info;
use triage_core::{ResourceId, SimTime};
use triage_engine::Kernel;
use triage_monitor::{EventMonitor, MonitorTraces, PollMonitor, snapshot_all};

use crate::{
    ArrivalGenerator, ClinicConfig, ModelResult, RunAccumulators, RunSummary, Staff, StaffIds,
};

/// Read-only parameters every process of a run refers to.
#[derive(Debug)]
pub struct Clinic {
    pub config: ClinicConfig,
    pub staff:  StaffIds,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary:      RunSummary,
    /// Raw samples.  Transient: not part of the summary.
    pub accumulators: RunAccumulators,
    /// Closed at the horizon.  Empty for monitors that were off.
    pub traces:       MonitorTraces,
}

/// Executes bounded runs of one validated configuration.
///
/// Every call builds a fresh kernel, fresh resources and fresh
/// accumulators, so calls are independent and repeatable.
///
/// ```rust,ignore
/// let run = ClinicRun::new(ClinicConfig::default())?;
/// let a = run.run_once()?;
/// let b = run.run_once()?;
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct ClinicRun {
    config: ClinicConfig,
}

impl ClinicRun {
    /// Validate `config`.
    pub fn new(config: ClinicConfig) -> ModelResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    /// Run to the horizon and return the summary.
    pub fn run_once(&self) -> ModelResult<RunSummary> {
        Ok(self.execute()?.summary)
    }

    /// Run to the horizon and return the summary together with the raw
    /// accumulators and monitor traces.
    pub fn execute(&self) -> ModelResult<RunOutcome> {
        let config = &self.config;
        let horizon = SimTime::try_new(config.horizon)?;
        info!(seed = config.seed, horizon = config.horizon, monitor = ?config.monitor, "run started");

        let mut kernel = Kernel::new(RunAccumulators::new());
        let mut ids = [ResourceId::INVALID; 4];
        for (slot, staff) in ids.iter_mut().zip(Staff::ALL) {
            *slot = kernel.add_resource(staff.name(), config.capacity(staff), config.discipline(staff))?;
        }
        let staff = StaffIds::new(ids);

        let mut events = config.monitor.event().then(EventMonitor::new);
        if let Some(monitor) = events.as_mut() {
            for (_, id) in staff.iter() {
                monitor.attach(kernel.resource_mut(id));
            }
        }

        let clinic = Rc::new(Clinic { config: config.clone(), staff });
        kernel.spawn(ArrivalGenerator::new(Rc::clone(&clinic)));

        let poll_handles = if config.monitor.poll() {
            let monitor = PollMonitor::new(config.poll_period, kernel.resources().iter())?;
            let handles = monitor.handles();
            kernel.spawn(monitor);
            handles
        } else {
            Vec::new()
        };

        let stats = kernel.run_until(horizon);

        let mut traces = MonitorTraces {
            event: events.map(|m| m.traces()).unwrap_or_default(),
            poll:  snapshot_all(&poll_handles),
        };
        traces.close_at(horizon, kernel.resources());

        let accumulators = kernel.into_world();
        let summary = RunSummary::reduce(config, &accumulators, &traces, &staff);
        info!(
            seed = config.seed, events = stats.events, arrivals = summary.arrivals,
            exits = summary.exits, preemptions = summary.preemptions,
            "run complete"
        );
        Ok(RunOutcome { summary, accumulators, traces })
    }
}
