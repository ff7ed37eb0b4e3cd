use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::sink::{FileOutput, NamingPolicy, WriteMode, DEFAULT_FOLDER};

/// How a configured file output is named (`"timestamp"` or `{ fixed = "name.txt" }`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConfig {
    #[default]
    Timestamp,
    Fixed(String),
}

/// One `[[file_output]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutputConfig {
    /// Folder the file is created in.
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
    /// "append" (default) keeps earlier tables; "overwrite" truncates.
    #[serde(default)]
    pub mode: WriteMode,
    #[serde(default)]
    pub naming: NamingConfig,
}

fn default_folder() -> PathBuf {
    PathBuf::from(DEFAULT_FOLDER)
}

impl FileOutputConfig {
    /// Validate into a file output, through the same checks as the API.
    pub fn to_output(&self) -> Result<FileOutput, ConfigError> {
        let naming = match &self.naming {
            NamingConfig::Timestamp => NamingPolicy::Timestamp,
            NamingConfig::Fixed(name) => NamingPolicy::FixedName(name.clone()),
        };
        FileOutput::new(self.folder.clone(), self.mode, naming)
    }
}

/// Global configuration loaded from `~/.config/benchtab/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Print the table to the console.
    pub console_output: bool,
    /// Show live in-place rows while jobs run (interactive consoles only).
    pub console_preview: bool,
    /// Maximum number of jobs running at once (1 = sequential).
    pub max_concurrency: usize,
    /// File outputs written by every run.
    #[serde(rename = "file_output")]
    pub file_outputs: Vec<FileOutputConfig>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            console_output: true,
            console_preview: true,
            max_concurrency: 1,
            file_outputs: Vec::new(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("benchtab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BenchConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<BenchConfig> {
    if !path.exists() {
        let default_cfg = BenchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: BenchConfig = toml::from_str(&data)?;
    Ok(cfg)
}
