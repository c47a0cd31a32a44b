//! Independent replications of one configuration.

use tracing::info;

use crate::{ClinicConfig, ClinicRun, ModelResult, RunSummary};

/// Run `runs` replications of `config` with seeds `seed, seed + 1, …` and
/// return their summaries in replication order.
///
/// Replications share no state.  With the `parallel` feature they execute on
/// Rayon's global thread pool.
pub fn run_batch(config: &ClinicConfig, runs: usize) -> ModelResult<Vec<RunSummary>> {
    config.validate()?;
    info!(runs, first_seed = config.seed, "batch started");

    let seeds: Vec<u64> = (0..runs as u64).map(|i| config.seed.wrapping_add(i)).collect();
    let replicate = |seed: u64| ClinicRun::new(config.with_seed(seed))?.run_once();

    #[cfg(not(feature = "parallel"))]
    {
        seeds.into_iter().map(replicate).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        seeds.into_par_iter().map(replicate).collect()
    }
}
