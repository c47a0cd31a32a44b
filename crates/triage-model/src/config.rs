//! Run configuration.

use triage_engine::{Discipline, Priority};

use crate::{ConfigError, Stage, Staff};

/// Which monitors are wired into a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MonitorMode {
    #[default]
    None,
    Event,
    Poll,
    Both,
}

impl MonitorMode {
    pub fn event(self) -> bool {
        matches!(self, MonitorMode::Event | MonitorMode::Both)
    }

    pub fn poll(self) -> bool {
        matches!(self, MonitorMode::Poll | MonitorMode::Both)
    }
}

/// Parameters of one clinic run.  Time is in abstract units (minutes in the
/// defaults).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClinicConfig {
    /// Mean gap between arrivals.  `+∞` means only the first patient
    /// arrives.  Default: 8.
    pub mean_interarrival: f64,
    /// Default: 2.
    pub mean_registration: f64,
    /// Default: 5.
    pub mean_triage: f64,
    /// Default: 60.
    pub mean_outpatient_assessment: f64,
    /// Default: 30.
    pub mean_emergency_assessment: f64,

    pub receptionists:      usize,
    pub nurses:             usize,
    pub outpatient_doctors: usize,
    pub emergency_doctors:  usize,

    /// Simulated time at which the run stops.  Default: 540.
    pub horizon: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    pub monitor: MonitorMode,

    /// Sampling period of the poll-driven monitor.  Default: 0.25.
    pub poll_period: f64,

    /// A patient goes to outpatient assessment when a uniform draw after
    /// triage falls below this value.  Default: 0.2.
    pub outpatient_threshold: f64,

    /// Admission policy of both doctor pools.  Registration and triage are
    /// always FIFO.
    pub assessment_discipline: Discipline,

    /// Acuity is drawn uniformly from `1..=acuity_levels` at the end of
    /// triage.  Default: 3.
    pub acuity_levels: u32,

    /// How much a preempted patient's priority improves per preemption.
    /// Default: 1.
    pub priority_boost: Priority,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            mean_interarrival:          8.0,
            mean_registration:          2.0,
            mean_triage:                5.0,
            mean_outpatient_assessment: 60.0,
            mean_emergency_assessment:  30.0,
            receptionists:              1,
            nurses:                     2,
            outpatient_doctors:         1,
            emergency_doctors:          2,
            horizon:                    540.0,
            seed:                       42,
            monitor:                    MonitorMode::None,
            poll_period:                0.25,
            outpatient_threshold:       0.2,
            assessment_discipline:      Discipline::Fifo,
            acuity_levels:              3,
            priority_boost:             1,
        }
    }
}

impl ClinicConfig {
    pub fn capacity(&self, staff: Staff) -> usize {
        match staff {
            Staff::Receptionist     => self.receptionists,
            Staff::Nurse            => self.nurses,
            Staff::OutpatientDoctor => self.outpatient_doctors,
            Staff::EmergencyDoctor  => self.emergency_doctors,
        }
    }

    pub fn mean_service(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Registration         => self.mean_registration,
            Stage::Triage               => self.mean_triage,
            Stage::OutpatientAssessment => self.mean_outpatient_assessment,
            Stage::EmergencyAssessment  => self.mean_emergency_assessment,
        }
    }

    pub fn discipline(&self, staff: Staff) -> Discipline {
        match staff {
            Staff::Receptionist | Staff::Nurse => Discipline::Fifo,
            Staff::OutpatientDoctor | Staff::EmergencyDoctor => self.assessment_discipline,
        }
    }

    /// The same configuration with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self { seed, ..self.clone() }
    }

    /// Check every value.  The first violation found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for staff in Staff::ALL {
            if self.capacity(staff) == 0 {
                return Err(ConfigError::ZeroCapacity { staff });
            }
        }

        if !(self.mean_interarrival > 0.0) {
            return Err(ConfigError::InvalidMean {
                what:  "mean inter-arrival time",
                value: self.mean_interarrival,
            });
        }
        for stage in Stage::ALL {
            let value = self.mean_service(stage);
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidMean { what: stage.name(), value });
            }
        }

        if !(self.horizon >= 0.0 && self.horizon.is_finite()) {
            return Err(ConfigError::InvalidHorizon(self.horizon));
        }
        if !(self.poll_period > 0.0 && self.poll_period.is_finite()) {
            return Err(ConfigError::InvalidPollPeriod(self.poll_period));
        }
        if !(0.0..=1.0).contains(&self.outpatient_threshold) {
            return Err(ConfigError::InvalidThreshold(self.outpatient_threshold));
        }
        if self.acuity_levels == 0 {
            return Err(ConfigError::ZeroAcuityLevels);
        }
        if self.priority_boost <= 0 {
            return Err(ConfigError::InvalidPriorityBoost(self.priority_boost));
        }
        Ok(())
    }
}
