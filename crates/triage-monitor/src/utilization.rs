//! Occupancy integrals and utilization ratios.
//!
//! ```text
//! utilization = ∫ in_use dt / (capacity × t_last)
//! ```
//!
//! The integral runs over the sampled range, `t_last` is the timestamp of the
//! final sample.  Occupancy before the first sample counts as zero.

use crate::{ResourceTrace, Sample};

/// How occupancy behaves between two consecutive samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Occupancy stays at the earlier sample's value until the next sample.
    /// Exact for event-driven traces, which only change at samples.
    Hold,
    /// Occupancy moves linearly between samples (plain trapezoids).  Used for
    /// poll-driven traces, which know nothing about what happened between
    /// ticks.
    Linear,
}

/// `∫ in_use dt` over the samples.  Zero for fewer than two samples.
pub fn occupancy_integral(samples: &[Sample], interpolation: Interpolation) -> f64 {
    samples
        .windows(2)
        .map(|w| {
            let dt = w[1].at.since(w[0].at);
            let (a, b) = (w[0].in_use as f64, w[1].in_use as f64);
            match interpolation {
                Interpolation::Hold => a * dt,
                Interpolation::Linear => 0.5 * (a + b) * dt,
            }
        })
        .sum()
}

/// Utilization of `trace`, in `[0, 1]`.
///
/// `None` if the trace is empty, its last sample is at time zero, or no
/// sample ever saw a slot in use.
pub fn utilization(trace: &ResourceTrace, interpolation: Interpolation) -> Option<f64> {
    let end = trace.last_time()?.as_f64();
    if end <= 0.0 || trace.capacity() == 0 || trace.max_in_use() == 0 {
        return None;
    }
    let area = occupancy_integral(trace.samples(), interpolation);
    Some(area / (trace.capacity() as f64 * end))
}
