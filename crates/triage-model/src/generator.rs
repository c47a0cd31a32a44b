//! `ArrivalGenerator` — spawns patients at exponential intervals.

use std::rc::Rc;

use tracing::trace;
use triage_core::{EntityId, EntityRng, SimRng};
use triage_engine::{Context, Process, Signal, Step};

use crate::{Clinic, Patient, PatientActivity, RunAccumulators};

/// Spawns one [`PatientActivity`] immediately on start and then after every
/// exponentially distributed gap, for as long as the run lasts.  Patient ids
/// start at 1 and increase by one.
pub struct ArrivalGenerator {
    clinic:  Rc<Clinic>,
    rng:     SimRng,
    next_id: EntityId,
}

impl ArrivalGenerator {
    pub fn new(clinic: Rc<Clinic>) -> Self {
        let rng = SimRng::new(clinic.config.seed);
        Self { clinic, rng, next_id: EntityId(1) }
    }
}

impl Process<RunAccumulators> for ArrivalGenerator {
    fn resume(&mut self, signal: Signal, ctx: &mut Context<'_, RunAccumulators>) -> Step {
        match signal {
            Signal::Start | Signal::Timeout => {
                let now = ctx.now();
                let id = self.next_id;
                self.next_id = id.next();

                ctx.world().record_arrival(now);
                let rng = EntityRng::new(self.clinic.config.seed, id);
                ctx.spawn(PatientActivity::new(Patient::new(id, now), rng, Rc::clone(&self.clinic)));

                let gap = self.rng.exp(self.clinic.config.mean_interarrival);
                trace!(patient = %id, gap, "spawned");
                Step::Hold(gap)
            }
            Signal::Granted(_) | Signal::Interrupted(_) => {
                unreachable!("arrival generator never requests a resource")
            }
        }
    }
}
