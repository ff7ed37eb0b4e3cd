//! benchtab core: declarative result tables and a bounded job runner.
//!
//! A result type describes its columns once ([`TableRow`]); a [`Benchmark`]
//! runs [`Job`]s producing that type and renders a bordered table to the
//! console and any configured files.

pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod job;
pub mod logging;
pub mod preview;
pub mod schema;
pub mod sink;
pub mod table;
pub mod terminal;

pub use engine::Benchmark;
pub use error::{BenchError, ConfigError, SchemaError};
pub use format::{Template, Value};
pub use job::{Job, Progress};
pub use schema::{schema_of, Column, Schema, SinkKind, TableRow, TableSpec, Visibility};
pub use sink::{FileOutput, NamingPolicy, WriteMode};
pub use terminal::Terminal;
