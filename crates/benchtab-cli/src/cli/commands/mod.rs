//! CLI command handlers, one file per command.

mod bench;
mod config;
mod pi;
mod sleep;

pub use bench::build_benchmark;
pub use config::run_config;
pub use pi::run_pi;
pub use sleep::run_sleep;
