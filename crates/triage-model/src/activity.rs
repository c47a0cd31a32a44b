//! `PatientActivity` — the per-patient state machine.
//!
//! ```text
//! Arrived ─► Queued(registration) ─► InService(registration)
//!        ─► Queued(triage) ─► InService(triage) ─► draw acuity, draw branch
//!        ─► Queued(assessment) ─► InService(assessment) ─► exit
//!                  ▲                      │
//!                  └──── preempted ───────┘   (priority improves each time)
//! ```
//!
//! Service durations are drawn when a stage's resource is first granted.  A
//! preempted patient requeues for the same stage and only owes what is left
//! of that draw.

use std::rc::Rc;

use tracing::debug;
use triage_core::{EntityRng, SimTime};
use triage_engine::{Context, Grant, Preemption, Priority, Process, Signal, Step};

use crate::{Clinic, Journey, Patient, RunAccumulators, Stage, StageVisit};

#[derive(Clone, Copy, Debug)]
enum Phase {
    Arrived,
    /// Waiting for the current stage's resource.
    Queued { since: SimTime },
    /// Holding the current stage's resource.
    InService { grant: Grant },
}

/// Drives one [`Patient`] through the clinic and writes its timings into the
/// run's [`RunAccumulators`].
pub struct PatientActivity {
    patient:   Patient,
    rng:       EntityRng,
    clinic:    Rc<Clinic>,
    phase:     Phase,
    visit:     StageVisit,
    /// Service still owed at the current stage; `None` until first granted.
    remaining: Option<f64>,
    visits:    Vec<StageVisit>,
}

impl PatientActivity {
    pub fn new(patient: Patient, rng: EntityRng, clinic: Rc<Clinic>) -> Self {
        Self {
            patient,
            rng,
            clinic,
            phase: Phase::Arrived,
            visit: StageVisit::new(Stage::Registration),
            remaining: None,
            visits: Vec::with_capacity(3),
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn enter(&mut self, stage: Stage, now: SimTime) -> Step {
        self.visit = StageVisit::new(stage);
        self.remaining = None;
        self.request(now)
    }

    fn request(&mut self, now: SimTime) -> Step {
        self.phase = Phase::Queued { since: now };
        Step::Request {
            resource: self.clinic.staff.get(self.visit.stage.staff()),
            priority: self.patient.request_priority(),
        }
    }

    fn start_service(
        &mut self,
        since: SimTime,
        grant: Grant,
        ctx:   &mut Context<'_, RunAccumulators>,
    ) -> Step {
        let stage = self.visit.stage;
        let wait = ctx.now().since(since);
        self.visit.queued += wait;

        let remaining = match self.remaining {
            Some(left) => left,
            None => {
                ctx.world().record_queued(stage, wait);
                let drawn = self.rng.exp(self.clinic.config.mean_service(stage));
                self.remaining = Some(drawn);
                drawn
            }
        };
        debug!(
            patient = %self.patient.id, %stage, wait, remaining,
            "started {stage} at {}", ctx.now()
        );
        self.phase = Phase::InService { grant };
        Step::Hold(remaining)
    }

    fn finish_service(&mut self, grant: Grant, ctx: &mut Context<'_, RunAccumulators>) -> Step {
        let now = ctx.now();
        let stage = self.visit.stage;
        self.visit.service += now.since(grant.granted_at);
        ctx.release(&grant);
        ctx.world().record_service(stage, self.visit.service);
        self.visits.push(self.visit);

        match stage {
            Stage::Registration => self.enter(Stage::Triage, now),
            Stage::Triage => {
                let config = &self.clinic.config;
                let levels = Priority::try_from(config.acuity_levels).unwrap_or(Priority::MAX);
                let acuity = self.rng.gen_range(1..=levels);
                let next = if self.rng.uniform() < config.outpatient_threshold {
                    Stage::OutpatientAssessment
                } else {
                    Stage::EmergencyAssessment
                };
                self.patient.acuity = Some(acuity);
                self.patient.priority = Some(acuity);
                debug!(patient = %self.patient.id, acuity, "routed to {next}");
                self.enter(next, now)
            }
            Stage::OutpatientAssessment | Stage::EmergencyAssessment => self.exit(ctx),
        }
    }

    fn preempted(&mut self, preemption: Preemption, ctx: &mut Context<'_, RunAccumulators>) -> Step {
        self.visit.service += preemption.usage;
        self.visit.preemptions += 1;
        self.remaining = self.remaining.map(|left| (left - preemption.usage).max(0.0));

        let boosted = self
            .patient
            .request_priority()
            .saturating_sub(self.clinic.config.priority_boost);
        self.patient.priority = Some(boosted);
        ctx.world().record_preemption();
        debug!(
            patient = %self.patient.id, stage = %self.visit.stage, by = %preemption.by,
            served = preemption.usage, priority = boosted, "preempted"
        );
        self.request(ctx.now())
    }

    fn exit(&mut self, ctx: &mut Context<'_, RunAccumulators>) -> Step {
        let journey = Journey {
            patient:    self.patient.id,
            arrived_at: self.patient.arrived_at,
            exited_at:  ctx.now(),
            acuity:     self.patient.acuity,
            priority:   self.patient.priority,
            visits:     std::mem::take(&mut self.visits),
        };
        debug!(patient = %self.patient.id, turnaround = journey.turnaround(), "exited");
        ctx.world().record_exit(journey);
        Step::Exit
    }
}

impl Process<RunAccumulators> for PatientActivity {
    fn resume(&mut self, signal: Signal, ctx: &mut Context<'_, RunAccumulators>) -> Step {
        match (self.phase, signal) {
            (Phase::Arrived, Signal::Start) => {
                debug!(patient = %self.patient.id, "arrived at {}", ctx.now());
                self.enter(Stage::Registration, ctx.now())
            }
            (Phase::Queued { since }, Signal::Granted(grant)) => {
                self.start_service(since, grant, ctx)
            }
            (Phase::InService { grant }, Signal::Timeout) => self.finish_service(grant, ctx),
            (Phase::InService { grant }, Signal::Interrupted(preemption)) => {
                debug_assert_eq!(grant.request, preemption.revoked);
                self.preempted(preemption, ctx)
            }
            (phase, signal) => unreachable!(
                "patient {}: {signal:?} while {phase:?}",
                self.patient.id
            ),
        }
    }
}
