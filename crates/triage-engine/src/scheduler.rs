//! The `Scheduler`: one clock plus one event queue.

use triage_core::{SimClock, SimTime};

use crate::{EventKey, EventQueue, Wake};

/// The single scheduling authority of a run.
///
/// Time only advances through [`next_due`](Self::next_due) (to the due time
/// of the popped event) and [`finish_at`](Self::finish_at) (to the horizon).
#[derive(Default)]
pub struct Scheduler {
    clock: SimClock,
    queue: EventQueue,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Enqueue `wake` at `now + delay`.
    ///
    /// `delay` may be `+∞` (the event is never reached by a finite horizon).
    ///
    /// # Panics
    /// Panics if `delay` is negative or `NaN`; scheduling into the past is a
    /// programming error.
    pub fn schedule(&mut self, delay: f64, wake: Wake) -> EventKey {
        assert!(delay >= 0.0, "negative scheduling delay {delay} at {}", self.now());
        let at = self.now() + delay;
        self.queue.push(at, wake)
    }

    /// Pop the earliest event due strictly before `horizon` and advance the
    /// clock to its due time.
    pub fn next_due(&mut self, horizon: SimTime) -> Option<Wake> {
        let (key, wake) = self.queue.pop_before(horizon)?;
        self.clock.advance_to(key.at);
        Some(wake)
    }

    /// Advance the clock to the horizon once no event before it remains.
    /// Infinite horizons leave the clock where the last event put it.
    pub fn finish_at(&mut self, horizon: SimTime) {
        if horizon.is_finite() && horizon > self.now() {
            self.clock.advance_to(horizon);
        }
    }

    /// Number of events still pending (including those past the horizon).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.queue.next_time()
    }
}
