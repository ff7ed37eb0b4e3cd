//! `benchtab sleep <MS>...` – jobs that only sleep; shows ordering under concurrency.

use anyhow::Result;
use benchtab_core::config::BenchConfig;

use super::build_benchmark;
use crate::cli::RunArgs;
use crate::samples::sleep::{SleepJob, SleepResult};

pub async fn run_sleep(cfg: &BenchConfig, args: &RunArgs, durations_ms: &[u64]) -> Result<()> {
    let bench = build_benchmark::<SleepResult>(cfg, args)?;
    let jobs: Vec<SleepJob> = durations_ms
        .iter()
        .enumerate()
        .map(|(id, &ms)| SleepJob::new(id + 1, ms))
        .collect();
    let name = args.name.as_deref().unwrap_or("Sleep");
    bench.run(jobs, Some(name)).await?;
    Ok(())
}
