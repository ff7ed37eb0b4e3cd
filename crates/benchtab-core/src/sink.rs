//! Output destinations of a run: the console and any number of files.
//!
//! A [`FileOutput`] is validated when it is created and opened once per run,
//! creating its folder first. Append keeps earlier tables; overwrite truncates.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, ConfigError};
use crate::schema::SinkKind;
use crate::terminal::Terminal;

/// Folder used when none is configured.
pub const DEFAULT_FOLDER: &str = "Benchmarks/";

/// Extension of timestamp-named files.
pub const TIMESTAMP_EXTENSION: &str = "txt";

/// Whether an existing output file keeps its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Append,
    Overwrite,
}

/// How the output file is named.
#[derive(Clone)]
pub enum NamingPolicy {
    /// Current Unix time in seconds, e.g. `1700000000.txt`.
    Timestamp,
    /// Fixed, non-empty file name.
    FixedName(String),
    /// Name produced by a function each time the output is opened.
    Custom(Arc<dyn Fn() -> String + Send + Sync>),
}

impl NamingPolicy {
    pub fn custom(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        NamingPolicy::Custom(Arc::new(f))
    }
}

impl fmt::Debug for NamingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingPolicy::Timestamp => f.write_str("Timestamp"),
            NamingPolicy::FixedName(name) => f.debug_tuple("FixedName").field(name).finish(),
            NamingPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A file destination: folder, write mode and naming policy.
#[derive(Debug, Clone)]
pub struct FileOutput {
    folder: PathBuf,
    mode: WriteMode,
    naming: NamingPolicy,
}

impl FileOutput {
    /// Validate and create a file output. An empty fixed name is rejected here,
    /// before any run starts.
    pub fn new(
        folder: impl Into<PathBuf>,
        mode: WriteMode,
        naming: NamingPolicy,
    ) -> Result<Self, ConfigError> {
        if let NamingPolicy::FixedName(name) = &naming {
            if name.is_empty() {
                return Err(ConfigError::EmptyFileName);
            }
        }
        Ok(Self {
            folder: folder.into(),
            mode,
            naming,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    pub fn naming(&self) -> &NamingPolicy {
        &self.naming
    }

    /// File name for a run starting now.
    pub fn file_name(&self) -> Result<String, ConfigError> {
        match &self.naming {
            NamingPolicy::Timestamp => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                Ok(format!("{}.{}", secs, TIMESTAMP_EXTENSION))
            }
            NamingPolicy::FixedName(name) => Ok(name.clone()),
            NamingPolicy::Custom(f) => {
                let name = f();
                if name.is_empty() {
                    return Err(ConfigError::EmptyCustomName);
                }
                Ok(name)
            }
        }
    }

    /// Create the folder and open the file for this run.
    pub fn open(&self) -> Result<FileSink, BenchError> {
        let name = self.file_name()?;
        fs::create_dir_all(&self.folder)?;
        let path = self.folder.join(name);
        let mut options = File::options();
        match self.mode {
            WriteMode::Append => options.create(true).append(true),
            WriteMode::Overwrite => options.create(true).write(true).truncate(true),
        };
        let file = options.open(&path)?;
        tracing::debug!(path = %path.display(), mode = ?self.mode, "opened file output");
        Ok(FileSink {
            writer: BufWriter::new(file),
        })
    }
}

impl Default for FileOutput {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_FOLDER),
            mode: WriteMode::Append,
            naming: NamingPolicy::Timestamp,
        }
    }
}

/// An open output file; closed when dropped.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
}

/// One destination of the rendered table.
#[derive(Debug)]
pub enum Sink {
    Console(Terminal),
    File(FileSink),
}

impl Sink {
    pub fn kind(&self) -> SinkKind {
        match self {
            Sink::Console(_) => SinkKind::Console,
            Sink::File(_) => SinkKind::File,
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::Console(t) => t.write(buf),
            Sink::File(f) => f.writer.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Sink::Console(t) => t.write_all(buf),
            Sink::File(f) => f.writer.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::Console(t) => t.flush(),
            Sink::File(f) => f.writer.flush(),
        }
    }
}
