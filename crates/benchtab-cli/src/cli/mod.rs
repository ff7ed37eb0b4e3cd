//! CLI for benchtab: run the sample benchmarks and inspect the config.

mod commands;

use anyhow::Result;
use benchtab_core::config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_config, run_pi, run_sleep};

/// Walk counts used by `benchtab pi` when none are given.
pub const DEFAULT_WALKS: [u64; 6] = [50, 500, 5_000, 50_000, 500_000, 5_000_000];

/// Top-level CLI for benchtab.
#[derive(Debug, Parser)]
#[command(name = "benchtab")]
#[command(about = "benchtab: run benchmark jobs and print their results as tables", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Estimate pi by Monte-Carlo sampling, one job per walk count.
    Pi {
        /// Repetitions per job; the table reports the best and median error.
        #[arg(long, default_value = "10", value_name = "N",
              value_parser = clap::value_parser!(u32).range(1..))]
        runs: u32,

        /// Random walks per repetition, one job per value.
        #[arg(value_name = "WALKS")]
        walks: Vec<u64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run jobs that sleep for the given durations (milliseconds).
    Sleep {
        /// One job per duration.
        #[arg(required = true, value_name = "MS")]
        durations_ms: Vec<u64>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show the config file path and its current values.
    Config,
}

/// Options shared by every benchmark command. Unset options keep the values
/// from the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Run up to N jobs concurrently (1 = sequential).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Do not print the table to the console.
    #[arg(long)]
    pub no_console: bool,

    /// Do not show live rows while jobs run.
    #[arg(long)]
    pub no_preview: bool,

    /// Also write the table to a file in this folder.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Truncate the output file instead of appending to it.
    #[arg(long, requires = "output_dir")]
    pub overwrite: bool,

    /// Output file name (default: `<unix seconds>.txt`).
    #[arg(long, requires = "output_dir", value_name = "NAME")]
    pub file_name: Option<String>,

    /// Title printed above the table.
    #[arg(long)]
    pub name: Option<String>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Pi { runs, walks, run } => {
                let walks = if walks.is_empty() {
                    DEFAULT_WALKS.to_vec()
                } else {
                    walks
                };
                run_pi(&cfg, &run, runs, &walks).await?;
            }
            CliCommand::Sleep { durations_ms, run } => {
                run_sleep(&cfg, &run, &durations_ms).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
