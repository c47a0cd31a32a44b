//! Base error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` or wrap it as one variant, whichever keeps error sites clean.

use thiserror::Error;

/// The top-level error type for `triage-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid time value {0}: must be a non-negative number")]
    InvalidTime(f64),
}

/// Shorthand result type for `triage-core`.
pub type CoreResult<T> = Result<T, CoreError>;

