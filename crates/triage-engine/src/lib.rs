//! `triage-engine` — the discrete-event core: scheduler, resources, processes.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`event_queue`] | `EventQueue` (`BTreeMap<EventKey, Wake>`), `Wake`       |
//! | [`scheduler`]   | `Scheduler` — clock + queue, `schedule(delay, wake)`    |
//! | [`resource`]    | `Resource`, `ResourcePool`, `Discipline`, `Grant`, `Preemption` |
//! | [`listener`]    | `ResourceListener`, `ResourceSnapshot`                  |
//! | [`process`]     | `Process` trait, `Signal`, `Step`, `Context`            |
//! | [`kernel`]      | `Kernel` — process table and dispatch loop              |
//! | [`error`]       | `EngineError`, `EngineResult<T>`                        |
//!
//! # Execution model
//!
//! One logical thread per run.  A process is an explicit state machine: the
//! kernel calls [`Process::resume`] with a [`Signal`] and the process answers
//! with the [`Step`] it suspends on.
//!
//! ```text
//! loop:
//!   pop earliest (due_time, seq) event  ── stop when due_time ≥ horizon
//!   advance clock to due_time
//!   Resume { process, signal } → drive process until it suspends:
//!       Hold(d)                 → schedule Timeout at now + d
//!       Request { res, prio }   → granted now?  resume again with Granted
//!                                 queued?       park (Allocate wakes it)
//!                                 preempting?   interrupt the victim, resume
//!       Exit                    → drop the process
//!   Allocate(res)           → hand freed slots to queued requests in order
//! ```
//!
//! Events with identical due times run in insertion order, so a run is fully
//! reproducible given a seeded RNG.

pub mod error;
pub mod event_queue;
pub mod kernel;
pub mod listener;
pub mod process;
pub mod resource;
pub mod scheduler;


pub use error::{EngineError, EngineResult};
pub use event_queue::{EventKey, EventQueue, Wake};
pub use kernel::{Kernel, RunStats};
pub use listener::{ResourceListener, ResourceSnapshot};
pub use process::{Context, Process, Signal, Step};
pub use resource::{
    Admission, DEFAULT_PRIORITY, Discipline, Grant, Preemption, Priority, Resource, ResourcePool,
};
pub use scheduler::Scheduler;
