//! Error types shared across the harness.
//!
//! Setup problems (`ConfigError`, `SchemaError`) surface before any job runs;
//! `BenchError` is what a run returns.

use thiserror::Error;

use crate::format::FormatError;

/// Invalid run or output configuration, raised at registration time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `NamingPolicy::FixedName` was given an empty name.
    #[error("file name must not be empty when using the fixed naming policy")]
    EmptyFileName,
    /// A custom naming function produced an empty name.
    #[error("custom file name function returned an empty name")]
    EmptyCustomName,
    /// Concurrency limit of zero would never start a job.
    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
}

/// A result type's column declarations are incomplete or malformed.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field `{field}` of {type_name} has no display name")]
    MissingName {
        type_name: &'static str,
        field: &'static str,
    },
    #[error("field `{field}` of {type_name} has width 0")]
    ZeroWidth {
        type_name: &'static str,
        field: &'static str,
    },
    #[error("field `{field}` of {type_name} has an invalid format")]
    Format {
        type_name: &'static str,
        field: &'static str,
        #[source]
        source: FormatError,
    },
}

/// Failure of a whole benchmark run. There is no partial success.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A job returned an error or panicked; the run is aborted.
    #[error("job {index} failed")]
    Job {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
    /// A worker task could not be joined (runtime shutdown or panic outside the job body).
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    /// Output could not be created or written.
    #[error("output: {0}")]
    Io(#[from] std::io::Error),
}
