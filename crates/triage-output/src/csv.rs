//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `run_summaries.csv`
//! - `resource_traces.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use triage_model::RunSummary;
use triage_monitor::MonitorTraces;

use crate::writer::OutputWriter;
use crate::{OutputResult, SummaryRow, TraceRow};

/// Writes run summaries and monitor traces to two CSV files.
pub struct CsvWriter {
    summaries: Writer<File>,
    traces:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir`, creating `dir` if needed, and write
    /// the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut summaries = Writer::from_path(dir.join("run_summaries.csv"))?;
        summaries.write_record(SummaryRow::header())?;

        let mut traces = Writer::from_path(dir.join("resource_traces.csv"))?;
        traces.write_record(TraceRow::HEADER)?;

        Ok(Self { summaries, traces, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_summary(&mut self, run: usize, summary: &RunSummary) -> OutputResult<()> {
        self.summaries.write_record(SummaryRow::new(run, summary).record())?;
        Ok(())
    }

    fn write_traces(&mut self, run: usize, traces: &MonitorTraces) -> OutputResult<()> {
        for (monitor, group) in [("event", &traces.event), ("poll", &traces.poll)] {
            for trace in group {
                for sample in trace.samples() {
                    self.traces.write_record(TraceRow::new(run, monitor, trace, sample).record())?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.traces.flush()?;
        Ok(())
    }
}
