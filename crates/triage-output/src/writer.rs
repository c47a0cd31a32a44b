//! The `OutputWriter` trait implemented by backend writers.

use triage_model::RunSummary;
use triage_monitor::MonitorTraces;

use crate::OutputResult;

/// A sink for the results of one or more runs.
pub trait OutputWriter {
    /// Write the summary of replication `run`.
    fn write_summary(&mut self, run: usize, summary: &RunSummary) -> OutputResult<()>;

    /// Write every sample of every trace of replication `run`.
    fn write_traces(&mut self, run: usize, traces: &MonitorTraces) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
