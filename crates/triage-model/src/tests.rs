//! Integration tests for triage-model.

use triage_engine::Discipline;
use tracing_test::traced_test;

use crate::{
    ClinicConfig, ClinicRun, ConfigError, ModelError, MonitorMode, RunOutcome, Stage, Staff,
    median, run_batch,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn execute(config: ClinicConfig) -> RunOutcome {
    ClinicRun::new(config).unwrap().execute().unwrap()
}

fn monitored() -> ClinicConfig {
    ClinicConfig { monitor: MonitorMode::Both, ..Default::default() }
}

/// One emergency doctor, everyone routed to it, preemptive admission.
fn contended() -> ClinicConfig {
    ClinicConfig {
        mean_interarrival:         10.0,
        mean_emergency_assessment: 8.0,
        emergency_doctors:         1,
        outpatient_threshold:      0.0,
        assessment_discipline:     Discipline::Preemptive,
        horizon:                   2_000.0,
        monitor:                   MonitorMode::Event,
        ..Default::default()
    }
}

fn config_error(config: ClinicConfig) -> ConfigError {
    match ClinicRun::new(config) {
        Err(ModelError::Config(e)) => e,
        other => panic!("expected a config error, got {other:?}"),
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClinicConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(Staff::Nurse), 2);
        assert_eq!(config.mean_service(Stage::OutpatientAssessment), 60.0);
        assert_eq!(config.discipline(Staff::Receptionist), Discipline::Fifo);
    }

    #[test]
    fn zero_capacity_rejected() {
        let e = config_error(ClinicConfig { nurses: 0, ..Default::default() });
        assert_eq!(e, ConfigError::ZeroCapacity { staff: Staff::Nurse });
    }

    #[test]
    fn non_positive_means_rejected() {
        for bad in [0.0, -2.0, f64::NAN] {
            let e = config_error(ClinicConfig { mean_triage: bad, ..Default::default() });
            assert!(matches!(e, ConfigError::InvalidMean { what: "triage", .. }));
            let e = config_error(ClinicConfig { mean_interarrival: bad, ..Default::default() });
            assert!(matches!(e, ConfigError::InvalidMean { .. }));
        }
        let e = config_error(ClinicConfig { mean_registration: f64::INFINITY, ..Default::default() });
        assert!(matches!(e, ConfigError::InvalidMean { what: "registration", .. }));
    }

    #[test]
    fn infinite_interarrival_accepted() {
        let config = ClinicConfig { mean_interarrival: f64::INFINITY, ..Default::default() };
        assert!(ClinicRun::new(config).is_ok());
    }

    #[test]
    fn bad_horizon_rejected() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let e = config_error(ClinicConfig { horizon: bad, ..Default::default() });
            assert!(matches!(e, ConfigError::InvalidHorizon(_)));
        }
    }

    #[test]
    fn other_values_rejected() {
        let e = config_error(ClinicConfig { poll_period: 0.0, ..Default::default() });
        assert!(matches!(e, ConfigError::InvalidPollPeriod(_)));
        let e = config_error(ClinicConfig { outpatient_threshold: 1.5, ..Default::default() });
        assert!(matches!(e, ConfigError::InvalidThreshold(_)));
        let e = config_error(ClinicConfig { acuity_levels: 0, ..Default::default() });
        assert_eq!(e, ConfigError::ZeroAcuityLevels);
        let e = config_error(ClinicConfig { priority_boost: 0, ..Default::default() });
        assert_eq!(e, ConfigError::InvalidPriorityBoost(0));
    }

    #[test]
    fn batch_validates_before_running() {
        let bad = ClinicConfig { receptionists: 0, ..Default::default() };
        assert!(matches!(run_batch(&bad, 3), Err(ModelError::Config(_))));
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod median_tests {
    use super::*;

    #[test]
    fn empty_is_absent() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn odd_and_even_counts() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }
}

// ── Runs ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn zero_horizon_reports_nothing() {
        let out = execute(ClinicConfig { horizon: 0.0, ..monitored() });
        let s = &out.summary;
        assert_eq!(s.arrivals, 0);
        assert_eq!(s.exits, 0);
        assert!(s.queued.is_empty());
        assert!(s.service.is_empty());
        assert_eq!(s.turnaround_median, None);
        assert!(s.utilization.is_empty());
        for staff in Staff::ALL {
            assert_eq!(s.utilization_of(staff), None);
        }
    }

    #[test]
    fn single_patient_utilization_is_exact() {
        let config = ClinicConfig {
            mean_interarrival: f64::INFINITY,
            monitor: MonitorMode::Both,
            ..Default::default()
        };
        let out = execute(config);
        assert_eq!(out.summary.arrivals, 1);
        assert_eq!(out.summary.exits, 1, "a lone patient finishes well within 540");

        let s = out.accumulators.service_for(Stage::Registration)[0];
        let u = out.summary.utilization[&Staff::Receptionist];
        assert_eq!(u.event, Some(s / 540.0));
        assert_eq!(u.ratio(), u.event);
    }

    #[test]
    fn huge_staff_pool_runs_to_completion() {
        let config = ClinicConfig { nurses: usize::MAX, horizon: 120.0, ..monitored() };
        let out = execute(config);
        assert!(out.summary.arrivals > 0);
        assert_eq!(out.summary.queued_median(Stage::Triage), Some(0.0));
        let nurse = out.summary.utilization_of(Staff::Nurse).unwrap();
        assert!((0.0..1e-9).contains(&nurse), "nurse utilization {nurse}");
    }

    #[test]
    fn turnaround_reconciles_with_stage_times() {
        for config in [ClinicConfig::default(), contended()] {
            let out = execute(config);
            assert!(!out.accumulators.journeys.is_empty());
            for j in &out.accumulators.journeys {
                assert!(
                    (j.turnaround() - j.accounted()).abs() < 1e-9,
                    "patient {}: turnaround {} vs accounted {}",
                    j.patient,
                    j.turnaround(),
                    j.accounted(),
                );
                assert_eq!(j.visits.len(), 3);
                assert!(j.final_stage().is_some_and(Stage::is_final));
            }
            assert_eq!(out.accumulators.turnaround.len(), out.accumulators.journeys.len());
        }
    }

    #[test]
    fn turnaround_recorded_on_outpatient_path() {
        let out = execute(ClinicConfig { outpatient_threshold: 1.0, ..Default::default() });
        assert!(out.summary.exits > 0);
        assert!(out.summary.turnaround_median.is_some());
        assert!(out.accumulators.queued_for(Stage::EmergencyAssessment).is_empty());
        assert!(out
            .accumulators
            .journeys
            .iter()
            .all(|j| j.final_stage() == Some(Stage::OutpatientAssessment)));
    }

    #[test]
    fn rerun_is_bit_identical() {
        let run = ClinicRun::new(contended()).unwrap();
        let a = run.execute().unwrap();
        let b = run.execute().unwrap();
        assert_eq!(a.accumulators, b.accumulators);
        let bits = |xs: &[f64]| xs.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.accumulators.turnaround), bits(&b.accumulators.turnaround));
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.traces, b.traces);
    }

    #[test]
    fn monitors_do_not_perturb_the_run() {
        let quiet = execute(ClinicConfig::default());
        let loud = execute(monitored());
        assert_eq!(quiet.accumulators, loud.accumulators);
        assert!(quiet.traces.event.is_empty() && quiet.traces.poll.is_empty());
        assert!(quiet.summary.utilization.is_empty());
        assert_eq!(loud.traces.event.len(), 4);
        assert_eq!(loud.traces.poll.len(), 4);
    }

    #[test]
    fn patient_ids_strictly_increase() {
        let out = execute(ClinicConfig::default());
        let arrivals = &out.accumulators.arrivals;
        assert!(arrivals.windows(2).all(|w| w[0] <= w[1]));
        let mut ids: Vec<u32> = out.accumulators.journeys.iter().map(|j| j.patient.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), out.accumulators.journeys.len());
        assert!(ids.iter().all(|&id| id >= 1 && id as usize <= arrivals.len()));
    }

    #[traced_test]
    #[test]
    fn logs_run_completion() {
        ClinicRun::new(ClinicConfig { horizon: 60.0, ..Default::default() })
            .unwrap()
            .run_once()
            .unwrap();
        assert!(logs_contain("run started"));
        assert!(logs_contain("run complete"));
    }
}

// ── Monitors ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod monitor_tests {
    use super::*;

    #[test]
    fn occupancy_never_exceeds_capacity() {
        for config in [monitored(), ClinicConfig { monitor: MonitorMode::Both, ..contended() }] {
            let out = execute(config);
            assert_eq!(out.traces.iter().count(), 8);
            for trace in out.traces.iter() {
                for s in trace.samples() {
                    assert!(s.in_use <= trace.capacity(), "{} over capacity at {}", trace.name(), s.at);
                }
            }
        }
    }

    #[test]
    fn estimators_converge_for_small_poll_period() {
        let out = execute(ClinicConfig { poll_period: 0.01, ..monitored() });
        for (staff, u) in &out.summary.utilization {
            let (Some(event), Some(poll)) = (u.event, u.poll) else {
                continue;
            };
            assert!((0.0..=1.0).contains(&event), "{staff}: {event}");
            assert!((event - poll).abs() < 0.01, "{staff}: event {event} vs poll {poll}");
        }
        assert!(out.summary.utilization_of(Staff::Nurse).is_some());
    }

    #[test]
    fn unused_staff_pool_is_absent_under_every_mode() {
        for monitor in [MonitorMode::None, MonitorMode::Event, MonitorMode::Poll, MonitorMode::Both] {
            let config = ClinicConfig { outpatient_threshold: 0.0, horizon: 60.0, monitor, ..Default::default() };
            let summary = execute(config).summary;
            assert!(
                !summary.utilization.contains_key(&Staff::OutpatientDoctor),
                "{monitor:?}: {:?}",
                summary.utilization
            );
            assert_eq!(summary.utilization_of(Staff::OutpatientDoctor), None, "{monitor:?}");
            if monitor != MonitorMode::None {
                assert!(summary.utilization_of(Staff::Receptionist).is_some(), "{monitor:?}");
            }
        }
    }
}

// ── Preemption ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod preemption_tests {
    use super::*;

    #[test]
    fn preempted_patients_finish() {
        let config = contended();
        let levels = config.acuity_levels;
        let out = execute(config);
        assert!(out.summary.preemptions > 0, "contended run saw no preemption");

        let preempted: Vec<_> = out
            .accumulators
            .journeys
            .iter()
            .filter(|j| j.visits.iter().any(|v| v.preemptions > 0))
            .collect();
        assert!(!preempted.is_empty(), "no preempted patient exited");

        for j in &out.accumulators.journeys {
            let n: u32 = j.visits.iter().map(|v| v.preemptions).sum();
            assert!(n < levels, "patient {} preempted {n} times", j.patient);
            assert!(j.priority.is_some_and(|p| p >= 1));
        }
    }

    #[test]
    fn each_preemption_improves_priority_by_the_boost() {
        for priority_boost in [1, 2] {
            let out = execute(ClinicConfig { priority_boost, ..contended() });
            assert!(out.summary.preemptions > 0, "boost {priority_boost}: no preemption");

            let mut preempted = 0;
            for j in &out.accumulators.journeys {
                let n: u32 = j.visits.iter().map(|v| v.preemptions).sum();
                let acuity = j.acuity.unwrap();
                let expected = acuity - priority_boost * n as i32;
                assert_eq!(j.priority, Some(expected), "patient {} preempted {n} times", j.patient);
                if n > 0 {
                    preempted += 1;
                }
            }
            assert!(preempted > 0, "boost {priority_boost}: no preempted patient exited");
        }
    }

    #[test]
    fn fifo_doctors_never_preempt() {
        let config = ClinicConfig { assessment_discipline: Discipline::Fifo, ..contended() };
        assert_eq!(execute(config).summary.preemptions, 0);
    }
}

// ── Batch ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod batch_tests {
    use super::*;

    #[test]
    fn replications_use_consecutive_seeds_in_order() {
        let config = ClinicConfig { horizon: 120.0, ..Default::default() };
        let summaries = run_batch(&config, 3).unwrap();
        let seeds: Vec<u64> = summaries.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, vec![42, 43, 44]);

        let single = ClinicRun::new(config.with_seed(43)).unwrap().run_once().unwrap();
        assert_eq!(summaries[1], single);
    }

    #[test]
    fn empty_batch() {
        assert!(run_batch(&ClinicConfig::default(), 0).unwrap().is_empty());
    }
}
