//! `triage-core` — foundational types for the triage discrete-event simulator.
//!
//! This crate is a dependency of every other `triage-*` crate.  It has no
//! `triage-*` dependencies and few external ones (`rand`, `rand_distr`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`ids`]   | `EntityId`, `ProcessId`, `ResourceId`, `RequestId`          |
//! | [`time`]  | `SimTime`, `SimClock`                                       |
//! | [`rng`]   | `EntityRng` (per-patient), `SimRng` (arrival stream)        |
//! | [`error`] | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{EntityId, ProcessId, RequestId, ResourceId};
pub use rng::{EntityRng, SimRng};
pub use time::{SimClock, SimTime};
