//! `triage-output` — writers for simulation results.
//!
//! | Backend | Files created                                      |
//! |---------|----------------------------------------------------|
//! | CSV     | `run_summaries.csv`, `resource_traces.csv`         |
//!
//! # Usage
//!
//! ```rust,ignore
//! use triage_output::{CsvWriter, OutputWriter};
//!
//! let mut writer = CsvWriter::new(Path::new("./output"))?;
//! for (run, outcome) in outcomes.iter().enumerate() {
//!     writer.write_summary(run, &outcome.summary)?;
//!     writer.write_traces(run, &outcome.traces)?;
//! }
//! writer.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use row::{SummaryRow, TraceRow};
pub use writer::OutputWriter;
