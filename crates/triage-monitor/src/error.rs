use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("poll period must be positive and finite, got {0}")]
    InvalidPeriod(f64),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
