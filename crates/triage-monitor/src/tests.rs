//! Unit and integration tests for triage-monitor.

use triage_core::{ProcessId, ResourceId, SimTime};
use triage_engine::{Context, Discipline, Grant, Kernel, Priority, Process, Signal, Step};

use crate::{
    EventMonitor, Interpolation, MonitorError, MonitorTraces, PollMonitor, ResourceTrace, Sample,
    occupancy_integral, snapshot_all, utilization,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn t(x: f64) -> SimTime {
    SimTime::new(x)
}

fn s(at: f64, in_use: usize, queued: usize) -> Sample {
    Sample { at: t(at), in_use, queued }
}

/// Waits `delay` (requesting at once if zero), holds one slot of
/// `resource` for `service`, exits.  A preempted job gives up.
struct Job {
    resource: ResourceId,
    delay:    f64,
    service:  f64,
    priority: Priority,
    grant:    Option<Grant>,
}

impl Job {
    fn new(resource: ResourceId, delay: f64, service: f64) -> Self {
        Self { resource, delay, service, priority: 0, grant: None }
    }

    fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl Process<()> for Job {
    fn resume(&mut self, signal: Signal, ctx: &mut Context<'_, ()>) -> Step {
        match signal {
            Signal::Start if self.delay > 0.0 => Step::Hold(self.delay),
            Signal::Start | Signal::Timeout => match self.grant.take() {
                None => Step::Request { resource: self.resource, priority: self.priority },
                Some(g) => {
                    ctx.release(&g);
                    Step::Exit
                }
            },
            Signal::Granted(g) => {
                self.grant = Some(g);
                Step::Hold(self.service)
            }
            Signal::Interrupted(_) => Step::Exit,
        }
    }
}

/// Run `jobs` against one resource with both monitors attached.
fn monitored_run(
    capacity:   usize,
    discipline: Discipline,
    period:     f64,
    horizon:    f64,
    jobs:       impl FnOnce(ResourceId) -> Vec<Job>,
) -> MonitorTraces {
    let mut kernel = Kernel::new(());
    let id = kernel.add_resource("desk", capacity, discipline).unwrap();
    let mut events = EventMonitor::new();
    events.attach(kernel.resource_mut(id));
    for job in jobs(id) {
        kernel.spawn(job);
    }
    let polls = PollMonitor::new(period, kernel.resources().iter()).unwrap();
    let handles = polls.handles();
    kernel.spawn(polls);

    let horizon = t(horizon);
    kernel.run_until(horizon);
    let mut traces = MonitorTraces { event: events.traces(), poll: snapshot_all(&handles) };
    traces.close_at(horizon, kernel.resources());
    traces
}

// ── ResourceTrace ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod trace_tests {
    use super::*;

    fn trace_with(capacity: usize, samples: &[Sample]) -> ResourceTrace {
        let mut tr = ResourceTrace::new(ResourceId(0), "nurse", capacity);
        for &x in samples {
            tr.push(x);
        }
        tr
    }

    #[test]
    fn amend_moves_one_request_into_service() {
        let mut tr = trace_with(2, &[s(0.0, 2, 1), s(3.0, 1, 1)]);
        assert!(tr.amend_after_grant(t(3.0)));
        assert_eq!(tr.samples(), &[s(0.0, 2, 1), s(3.0, 2, 0)]);
    }

    #[test]
    fn amend_ignores_older_sample() {
        let mut tr = trace_with(2, &[s(3.0, 1, 1)]);
        assert!(!tr.amend_after_grant(t(3.5)));
        assert_eq!(tr.samples(), &[s(3.0, 1, 1)]);
    }

    #[test]
    fn amend_ignores_empty_queue() {
        let mut tr = trace_with(2, &[s(3.0, 1, 0)]);
        assert!(!tr.amend_after_grant(t(3.0)));
    }

    #[test]
    fn amend_never_exceeds_capacity() {
        let mut tr = trace_with(1, &[s(3.0, 1, 2)]);
        assert!(!tr.amend_after_grant(t(3.0)));
        assert_eq!(tr.max_in_use(), 1);
    }

    #[test]
    fn amend_on_empty_trace_is_noop() {
        let mut tr = trace_with(1, &[]);
        assert!(!tr.amend_after_grant(t(0.0)));
        assert!(tr.is_empty());
    }

    #[test]
    fn close_extends_only_non_empty_traces() {
        let pool_snapshot = |at: f64| triage_engine::ResourceSnapshot {
            resource: ResourceId(0),
            at:       t(at),
            in_use:   1,
            queued:   0,
            capacity: 1,
        };
        let mut empty = trace_with(1, &[]);
        empty.close_with(&pool_snapshot(10.0));
        assert!(empty.is_empty());

        let mut tr = trace_with(1, &[s(2.0, 1, 0)]);
        tr.close_with(&pool_snapshot(10.0));
        tr.close_with(&pool_snapshot(10.0));
        assert_eq!(tr.samples(), &[s(2.0, 1, 0), s(10.0, 1, 0)]);
    }
}

// ── Utilization ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod utilization_tests {
    use super::*;

    #[test]
    fn hold_and_linear_integrals() {
        let samples = [s(0.0, 0, 0), s(2.0, 2, 0), s(4.0, 1, 0), s(8.0, 1, 0)];
        // Hold: 0·2 + 2·2 + 1·4
        assert_eq!(occupancy_integral(&samples, Interpolation::Hold), 8.0);
        // Linear: 1·2 + 1.5·2 + 1·4
        assert_eq!(occupancy_integral(&samples, Interpolation::Linear), 9.0);
    }

    #[test]
    fn short_traces_integrate_to_zero() {
        assert_eq!(occupancy_integral(&[], Interpolation::Hold), 0.0);
        assert_eq!(occupancy_integral(&[s(1.0, 1, 0)], Interpolation::Linear), 0.0);
    }

    #[test]
    fn empty_or_zero_range_is_absent() {
        let empty = ResourceTrace::new(ResourceId(0), "doc", 1);
        assert_eq!(utilization(&empty, Interpolation::Hold), None);

        let mut at_zero = ResourceTrace::new(ResourceId(0), "doc", 1);
        at_zero.push(s(0.0, 1, 0));
        assert_eq!(utilization(&at_zero, Interpolation::Linear), None);
    }

    #[test]
    fn idle_trace_is_absent() {
        let mut idle = ResourceTrace::new(ResourceId(0), "doc", 1);
        for x in [s(0.0, 0, 0), s(0.25, 0, 0), s(60.0, 0, 0)] {
            idle.push(x);
        }
        assert_eq!(utilization(&idle, Interpolation::Linear), None);
        assert_eq!(utilization(&idle, Interpolation::Hold), None);
    }

    #[test]
    fn divides_by_capacity_and_last_timestamp() {
        let mut tr = ResourceTrace::new(ResourceId(0), "nurse", 2);
        for x in [s(0.0, 2, 0), s(5.0, 0, 0), s(10.0, 0, 0)] {
            tr.push(x);
        }
        assert_eq!(utilization(&tr, Interpolation::Hold), Some(0.5));
    }
}

// ── EventMonitor ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod event_monitor_tests {
    use super::*;
    use triage_engine::{Admission, Resource};

    #[test]
    fn single_job_utilization_is_exact() {
        let traces = monitored_run(1, Discipline::Fifo, 0.25, 10.0, |id| vec![Job::new(id, 0.0, 3.0)]);
        let event = traces.event_for(ResourceId(0)).unwrap();
        assert_eq!(event.samples(), &[s(0.0, 1, 0), s(3.0, 0, 0), s(10.0, 0, 0)]);
        assert_eq!(utilization(event, Interpolation::Hold), Some(0.3));
    }

    #[test]
    fn hand_over_is_amended_in_place() {
        let traces = monitored_run(1, Discipline::Fifo, 1.0, 20.0, |id| {
            vec![Job::new(id, 0.0, 5.0), Job::new(id, 0.0, 5.0)]
        });
        let event = traces.event_for(ResourceId(0)).unwrap();
        assert_eq!(
            event.samples(),
            &[s(0.0, 1, 0), s(0.0, 1, 1), s(5.0, 1, 0), s(10.0, 0, 0), s(20.0, 0, 0)]
        );
        assert_eq!(utilization(event, Interpolation::Hold), Some(0.5));
    }

    #[test]
    fn simultaneous_releases_amend_each_grant() {
        let traces = monitored_run(2, Discipline::Fifo, 1.0, 20.0, |id| {
            (0..4).map(|_| Job::new(id, 0.0, 4.0)).collect()
        });
        let event = traces.event_for(ResourceId(0)).unwrap();
        let at_four: Vec<Sample> = event.samples().iter().copied().filter(|x| x.at == t(4.0)).collect();
        assert_eq!(at_four.last(), Some(&s(4.0, 2, 0)));
        assert!(event.samples().iter().all(|x| x.in_use <= 2));
    }

    #[test]
    fn preempting_grant_is_not_counted_twice() {
        let mut r = Resource::new(ResourceId(0), "er", 1, Discipline::Preemptive).unwrap();
        let mut monitor = EventMonitor::new();
        monitor.attach(&mut r);

        let first = match r.request(t(0.0), ProcessId(0), 3) {
            Admission::Granted(g) => g,
            other => panic!("unexpected {other:?}"),
        };
        r.confirm_grant(t(0.0), &first);
        assert!(matches!(r.request(t(1.0), ProcessId(1), 3), Admission::Queued(_)));
        let Admission::Preempting { grant, .. } = r.request(t(2.0), ProcessId(2), 1) else {
            panic!("expected preemption");
        };
        r.confirm_grant(t(2.0), &grant);

        let traces = monitor.traces();
        assert_eq!(traces[0].samples(), &[s(0.0, 1, 0), s(1.0, 1, 1), s(2.0, 1, 1)]);
    }

    #[test]
    fn occupancy_never_exceeds_capacity_under_preemption() {
        let traces = monitored_run(2, Discipline::Preemptive, 0.5, 100.0, |id| {
            (0..12)
                .map(|i| {
                    Job::new(id, i as f64 * 1.5, 4.0 + (i % 4) as f64)
                        .with_priority(3 - (i % 4) as Priority)
                })
                .collect()
        });
        for trace in traces.iter() {
            assert!(trace.max_in_use() <= trace.capacity(), "{}", trace.name());
        }
    }
}

// ── PollMonitor ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod poll_monitor_tests {
    use super::*;

    #[test]
    fn rejects_non_positive_period() {
        let kernel: Kernel<()> = Kernel::new(());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                PollMonitor::new(bad, kernel.resources().iter()),
                Err(MonitorError::InvalidPeriod(_))
            ));
        }
    }

    #[test]
    fn samples_every_period_until_horizon() {
        let traces = monitored_run(1, Discipline::Fifo, 1.0, 5.0, |id| vec![Job::new(id, 0.0, 2.5)]);
        let poll = traces.poll_for(ResourceId(0)).unwrap();
        let in_use: Vec<usize> = poll.samples().iter().map(|x| x.in_use).collect();
        assert_eq!(in_use, vec![1, 1, 1, 0, 0, 0]);
        assert_eq!(poll.last_time(), Some(t(5.0)));
        let u = utilization(poll, Interpolation::Linear).unwrap();
        assert!((u - 0.5).abs() < 1e-12, "poll utilization {u}");
    }

    #[test]
    fn zero_horizon_records_nothing() {
        let traces = monitored_run(1, Discipline::Fifo, 1.0, 0.0, |id| vec![Job::new(id, 0.0, 2.5)]);
        assert!(traces.iter().all(ResourceTrace::is_empty));
        assert!(traces.iter().all(|tr| utilization(tr, Interpolation::Hold).is_none()));
    }

    #[test]
    fn idle_resource_has_no_poll_utilization() {
        let traces = monitored_run(1, Discipline::Fifo, 0.25, 10.0, |_| Vec::new());
        let poll = traces.poll_for(ResourceId(0)).unwrap();
        assert!(!poll.is_empty());
        assert_eq!(utilization(poll, Interpolation::Linear), None);
        assert!(traces.event_for(ResourceId(0)).is_none_or(ResourceTrace::is_empty));
    }

    #[test]
    fn reports_configured_period() {
        let kernel: Kernel<()> = Kernel::new(());
        let monitor = PollMonitor::new(0.25, kernel.resources().iter()).unwrap();
        assert_eq!(monitor.period(), 0.25);
        assert!(monitor.handles().is_empty());
    }

    #[test]
    fn estimators_converge_as_period_shrinks() {
        let jobs = |id| {
            (0..20)
                .map(|i| Job::new(id, i as f64 * 4.3, 1.0 + ((i * 7) % 5) as f64 * 1.7))
                .collect()
        };
        let traces = monitored_run(2, Discipline::Fifo, 0.01, 100.0, jobs);
        let coarse = monitored_run(2, Discipline::Fifo, 5.0, 100.0, jobs);
        assert_eq!(traces.event, coarse.event, "poll period must not perturb the run");
        let exact = utilization(traces.event_for(ResourceId(0)).unwrap(), Interpolation::Hold).unwrap();
        let polled = utilization(traces.poll_for(ResourceId(0)).unwrap(), Interpolation::Linear).unwrap();
        assert!(exact > 0.0);
        assert!((exact - polled).abs() < 0.01, "event {exact} vs poll {polled}");
    }
}
