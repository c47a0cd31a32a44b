//! `triage-model` — the clinic triage model on top of `triage-engine`.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`config`]       | `ClinicConfig`, `MonitorMode`, validation             |
//! | [`stage`]        | `Stage`, `Staff`, `StaffIds`                          |
//! | [`patient`]      | `Patient`                                             |
//! | [`activity`]     | `PatientActivity` — the per-patient state machine     |
//! | [`generator`]    | `ArrivalGenerator` — exponential arrivals             |
//! | [`accumulators`] | `RunAccumulators`, `Journey`, `StageVisit`            |
//! | [`summary`]      | `RunSummary`, `Utilization`, `median`                 |
//! | [`run`]          | `ClinicRun` — one bounded run, `RunOutcome`           |
//! | [`batch`]        | `run_batch` — independent replications                |
//! | [`error`]        | `ConfigError`, `ModelError`, `ModelResult<T>`         |
//!
//! # Patient flow
//!
//! ```text
//! arrive ─► registration ─► triage ─┬─ u < threshold ─► outpatient assessment ─► exit
//!          (receptionist)  (nurse)  └─ otherwise ─────► emergency assessment ──► exit
//!                                                       (doctors, optionally preemptive)
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! let run = ClinicRun::new(ClinicConfig { monitor: MonitorMode::Both, ..Default::default() })?;
//! let summary = run.run_once()?;
//! println!("median TAT: {:?}", summary.turnaround_median);
//! ```

pub mod accumulators;
pub mod activity;
pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod patient;
pub mod run;
pub mod stage;
pub mod summary;

#[cfg(test)]
mod tests;

pub use accumulators::{Journey, RunAccumulators, StageVisit};
pub use activity::PatientActivity;
pub use batch::run_batch;
pub use config::{ClinicConfig, MonitorMode};
pub use error::{ConfigError, ModelError, ModelResult};
pub use generator::ArrivalGenerator;
pub use patient::Patient;
pub use run::{Clinic, ClinicRun, RunOutcome};
pub use stage::{Stage, Staff, StaffIds};
pub use summary::{RunSummary, Utilization, median};
