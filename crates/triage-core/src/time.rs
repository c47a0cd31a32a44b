//! Simulation time model.
//!
//! # Design
//!
//! Time is a non-negative real number of abstract time units (the clinic
//! model reads them as minutes).  `SimTime` wraps an `f64` and is totally
//! ordered, so it can key a `BTreeMap` directly.  `NaN` is never a valid
//! time; constructors reject it.
//!
//! `SimTime::INFINITY` is a valid time: an event scheduled at infinity is
//! never reached by a finite horizon, which is how "this never happens
//! again" is expressed without a special case in the scheduler.

use std::cmp::Ordering;
use std::fmt;

use crate::{CoreError, CoreResult};

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulated instant.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);
    pub const INFINITY: SimTime = SimTime(f64::INFINITY);

    /// Wrap a raw time value.
    ///
    /// # Panics
    /// Panics if `t` is `NaN` or negative.
    #[inline]
    pub fn new(t: f64) -> SimTime {
        assert!(t >= 0.0, "simulated time must be a non-negative number, got {t}");
        SimTime(t)
    }

    /// Checked variant of [`SimTime::new`] for values read from
    /// configuration.
    pub fn try_new(t: f64) -> CoreResult<SimTime> {
        if t >= 0.0 { Ok(SimTime(t)) } else { Err(CoreError::InvalidTime(t)) }
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// Time units elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        debug_assert!(earlier <= self, "since(): {earlier} is after {self}");
        self.0 - earlier.0
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::ops::Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime::new(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl From<SimTime> for f64 {
    #[inline]
    fn from(t: SimTime) -> f64 {
        t.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.2}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The current simulated instant of one run.
///
/// `SimClock` only moves forward.  The scheduler advances it to the due time
/// of every event it dispatches and, at the end of a run, to the horizon.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    /// A clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock to `t`.
    ///
    /// # Panics
    /// Panics if `t` is earlier than the current time.
    #[inline]
    pub fn advance_to(&mut self, t: SimTime) {
        assert!(
            t >= self.now,
            "cannot move clock backwards: now={}, target={}",
            self.now,
            t,
        );
        self.now = t;
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.now)
    }
}
