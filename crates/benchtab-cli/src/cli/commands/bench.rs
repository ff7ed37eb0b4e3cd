//! Benchmark setup shared by the sample commands.

use anyhow::Result;
use benchtab_core::config::BenchConfig;
use benchtab_core::{Benchmark, NamingPolicy, TableRow, WriteMode};

use crate::cli::RunArgs;

/// Benchmark from the config file, with command-line overrides on top.
pub fn build_benchmark<R: TableRow>(cfg: &BenchConfig, args: &RunArgs) -> Result<Benchmark<R>> {
    let mut bench = Benchmark::from_config(cfg)?;
    if let Some(jobs) = args.jobs {
        bench = bench.with_max_concurrency(jobs)?;
    }
    if args.no_console {
        bench = bench.with_console(false);
    }
    if args.no_preview {
        bench = bench.with_preview(false);
    }
    if let Some(dir) = &args.output_dir {
        let mode = if args.overwrite {
            WriteMode::Overwrite
        } else {
            WriteMode::Append
        };
        let naming = match &args.file_name {
            Some(name) => NamingPolicy::FixedName(name.clone()),
            None => NamingPolicy::Timestamp,
        };
        bench.add_file_output(dir, mode, naming)?;
    }
    Ok(bench)
}
