use triage_core::{EntityId, SimTime};
use triage_engine::{DEFAULT_PRIORITY, Priority};

/// A simulated patient.  Owned by its [`PatientActivity`](crate::PatientActivity)
/// and dropped when it exits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Patient {
    pub id:         EntityId,
    pub arrived_at: SimTime,
    /// Acuity drawn at the end of triage, lower is more urgent.
    pub acuity:     Option<Priority>,
    /// Starts at the acuity and improves by the configured boost on every
    /// preemption.
    pub priority:   Option<Priority>,
}

impl Patient {
    pub fn new(id: EntityId, arrived_at: SimTime) -> Self {
        Self { id, arrived_at, acuity: None, priority: None }
    }

    /// Priority to request resources with.
    #[inline]
    pub fn request_priority(&self) -> Priority {
        self.priority.unwrap_or(DEFAULT_PRIORITY)
    }
}
