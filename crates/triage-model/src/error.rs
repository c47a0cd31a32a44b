use thiserror::Error;
use triage_core::CoreError;
use triage_engine::{EngineError, Priority};
use triage_monitor::MonitorError;

use crate::Staff;

/// A rejected [`ClinicConfig`](crate::ClinicConfig) value.  Values are never
/// clamped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{staff} capacity must be positive")]
    ZeroCapacity { staff: Staff },

    #[error("{what} must be a positive number, got {value}")]
    InvalidMean { what: &'static str, value: f64 },

    #[error("horizon must be finite and non-negative, got {0}")]
    InvalidHorizon(f64),

    #[error("poll period must be positive and finite, got {0}")]
    InvalidPollPeriod(f64),

    #[error("outpatient threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("acuity levels must be positive")]
    ZeroAcuityLevels,

    #[error("priority boost must be positive, got {0}")]
    InvalidPriorityBoost(Priority),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("monitor error: {0}")]
    Monitor(#[from] MonitorError),
}

pub type ModelResult<T> = Result<T, ModelError>;
