//! triage — command-line driver for the clinic triage simulator.
//!
//! Runs one replication (printing per-stage medians and staff utilization)
//! or a batch of independent replications (printing one line per run).
//! Configuration comes from the defaults, an optional JSON file, and
//! command-line overrides, in that order.
//!
//! ```text
//! triage --monitor both --out output/triage
//! triage --config clinic.json --runs 30
//! RUST_LOG=triage_model=debug triage --horizon 60
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use triage_engine::Discipline;
use triage_model::{ClinicConfig, ClinicRun, MonitorMode, RunSummary, Stage, Staff, run_batch};
use triage_output::{CsvWriter, OutputWriter};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Discrete-event simulation of a clinic triage process")]
#[command(version)]
struct Cli {
    /// JSON file with a (partial) clinic configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of independent replications
    #[arg(short, long, default_value = "1")]
    runs: usize,

    /// Seed of the first replication
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated time at which each run stops
    #[arg(long)]
    horizon: Option<f64>,

    /// Utilization monitors to attach
    #[arg(long, value_enum)]
    monitor: Option<MonitorArg>,

    /// Admission policy of both doctor pools
    #[arg(long, value_enum)]
    discipline: Option<DisciplineArg>,

    /// Directory for run_summaries.csv and resource_traces.csv
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum MonitorArg {
    None,
    Event,
    Poll,
    Both,
}

impl From<MonitorArg> for MonitorMode {
    fn from(arg: MonitorArg) -> Self {
        match arg {
            MonitorArg::None  => MonitorMode::None,
            MonitorArg::Event => MonitorMode::Event,
            MonitorArg::Poll  => MonitorMode::Poll,
            MonitorArg::Both  => MonitorMode::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DisciplineArg {
    Fifo,
    Priority,
    Preemptive,
}

impl From<DisciplineArg> for Discipline {
    fn from(arg: DisciplineArg) -> Self {
        match arg {
            DisciplineArg::Fifo       => Discipline::Fifo,
            DisciplineArg::Priority   => Discipline::Priority,
            DisciplineArg::Preemptive => Discipline::Preemptive,
        }
    }
}

impl Cli {
    fn clinic_config(&self) -> Result<ClinicConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            None => ClinicConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(horizon) = self.horizon {
            config.horizon = horizon;
        }
        if let Some(monitor) = self.monitor {
            config.monitor = monitor.into();
        }
        if let Some(discipline) = self.discipline {
            config.assessment_discipline = discipline.into();
        }
        config.validate()?;
        Ok(config)
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = cli.clinic_config()?;

    println!("=== triage — clinic triage simulator ===");
    println!(
        "Horizon: {}  |  Seed: {}  |  Runs: {}  |  Monitor: {:?}  |  Doctors: {:?}",
        config.horizon, config.seed, cli.runs, config.monitor, config.assessment_discipline
    );
    println!(
        "Staff: {} receptionist(s), {} nurse(s), {} outpatient doctor(s), {} emergency doctor(s)",
        config.receptionists, config.nurses, config.outpatient_doctors, config.emergency_doctors
    );
    println!();

    let mut writer = cli.out.as_deref().map(CsvWriter::new).transpose()?;

    let t0 = Instant::now();
    if cli.runs == 1 {
        let outcome = ClinicRun::new(config)?.execute()?;
        print_summary(&outcome.summary);
        if let Some(w) = writer.as_mut() {
            w.write_summary(0, &outcome.summary)?;
            w.write_traces(0, &outcome.traces)?;
        }
    } else {
        let summaries = run_batch(&config, cli.runs)?;
        print_batch(&summaries);
        if let Some(w) = writer.as_mut() {
            for (run, summary) in summaries.iter().enumerate() {
                w.write_summary(run, summary)?;
            }
        }
    }
    if let Some(mut w) = writer {
        w.finish()?;
    }
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, "done");

    if let Some(dir) = &cli.out {
        println!();
        println!("Output written to {}", dir.display());
    }
    Ok(())
}

// ── Reporting ─────────────────────────────────────────────────────────────────

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.2}"))
}

fn print_summary(s: &RunSummary) {
    println!(
        "Arrivals: {}  |  Exits: {}  |  Preemptions: {}  |  Median TAT: {}",
        s.arrivals,
        s.exits,
        s.preemptions,
        fmt_opt(s.turnaround_median)
    );
    println!();

    println!("{:<24} {:>12} {:>12}", "Stage", "Queued (med)", "Service (med)");
    println!("{}", "-".repeat(50));
    for stage in Stage::ALL {
        println!(
            "{:<24} {:>12} {:>12}",
            stage.name(),
            fmt_opt(s.queued_median(stage)),
            fmt_opt(s.service_median(stage)),
        );
    }

    if s.utilization.is_empty() {
        return;
    }
    println!();
    println!("{:<20} {:>10} {:>10}", "Staff", "Event", "Poll");
    println!("{}", "-".repeat(42));
    for staff in Staff::ALL {
        let u = s.utilization.get(&staff).copied().unwrap_or_default();
        println!("{:<20} {:>10} {:>10}", staff.name(), fmt_opt(u.event), fmt_opt(u.poll));
    }
}

fn print_batch(summaries: &[RunSummary]) {
    println!("{:<6} {:>6} {:>8} {:>6} {:>12}", "Run", "Seed", "Arrivals", "Exits", "Median TAT");
    println!("{}", "-".repeat(42));
    for (run, s) in summaries.iter().enumerate() {
        println!(
            "{:<6} {:>6} {:>8} {:>6} {:>12}",
            run,
            s.seed,
            s.arrivals,
            s.exits,
            fmt_opt(s.turnaround_median)
        );
    }

    let tats: Vec<f64> = summaries.iter().filter_map(|s| s.turnaround_median).collect();
    if !tats.is_empty() {
        println!();
        println!(
            "Mean of median TAT over {} run(s): {:.2}",
            tats.len(),
            tats.iter().sum::<f64>() / tats.len() as f64
        );
    }
}
