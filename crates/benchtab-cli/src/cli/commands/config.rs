//! `benchtab config` – show where the config lives and what it holds.

use anyhow::{Context, Result};
use benchtab_core::config::{self, BenchConfig};

pub fn run_config(cfg: &BenchConfig) -> Result<()> {
    let path = config::config_path()?;
    let rendered = toml::to_string_pretty(cfg).context("render config")?;
    println!("# {}", path.display());
    print!("{}", rendered);
    Ok(())
}
