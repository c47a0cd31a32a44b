//! Deterministic per-entity and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each patient gets its own independent `SmallRng` seeded by:
//!
//!   seed = run_seed XOR (entity_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive entity IDs uniformly across the seed space.
//! Service, routing and acuity draws of one patient therefore never depend
//! on how many draws other patients made before it, and switching a monitor
//! on or off cannot perturb a run.
//!
//! Inter-arrival gaps come from a single run-level [`SimRng`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::EntityId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Draw from an exponential distribution with the given mean.
///
/// An infinite mean yields `f64::INFINITY` ("never").
#[inline]
fn sample_exp(rng: &mut SmallRng, mean: f64) -> f64 {
    debug_assert!(mean > 0.0, "exponential mean must be positive, got {mean}");
    if mean == f64::INFINITY {
        return f64::INFINITY;
    }
    match Exp::new(mean.recip()) {
        Ok(dist) => dist.sample(rng),
        Err(_) => f64::INFINITY,
    }
}

// ── EntityRng ─────────────────────────────────────────────────────────────────

/// Per-entity deterministic RNG.
///
/// Created by the arrival generator together with the patient and owned by
/// that patient's activity for its whole lifecycle.
pub struct EntityRng(SmallRng);

impl EntityRng {
    /// Seed deterministically from the run seed and an entity ID.
    pub fn new(run_seed: u64, entity: EntityId) -> Self {
        let seed = run_seed ^ (entity.0 as u64).wrapping_mul(MIXING_CONSTANT);
        EntityRng(SmallRng::seed_from_u64(seed))
    }

    /// Exponentially distributed duration with mean `mean`.
    #[inline]
    pub fn exp(&mut self, mean: f64) -> f64 {
        sample_exp(&mut self.0, mean)
    }

    /// Uniform draw in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG for the arrival stream.
///
/// Used only from the single logical thread of one run.  Independent runs of
/// a batch each build their own.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Exponentially distributed gap with mean `mean`.
    #[inline]
    pub fn exp(&mut self, mean: f64) -> f64 {
        sample_exp(&mut self.0, mean)
    }
}
