//! `benchtab pi [WALKS...]` – Monte-Carlo pi estimation benchmark.

use anyhow::Result;
use benchtab_core::config::BenchConfig;

use super::build_benchmark;
use crate::cli::RunArgs;
use crate::samples::pi::{PiJob, PiResult};

pub async fn run_pi(cfg: &BenchConfig, args: &RunArgs, runs: u32, walks: &[u64]) -> Result<()> {
    let bench = build_benchmark::<PiResult>(cfg, args)?;
    let jobs: Vec<PiJob> = walks.iter().map(|&w| PiJob::new(runs, w)).collect();
    let name = args.name.as_deref().unwrap_or("PI estimation");
    let results = bench.run(jobs, Some(name)).await?;

    if let Some(best) = results
        .iter()
        .min_by(|a, b| a.error_min.total_cmp(&b.error_min))
    {
        tracing::info!(
            walks = best.walks,
            error = best.error_min,
            "closest estimate {}",
            best.best_estimation
        );
    }
    Ok(())
}
