//! Tests for the shared run options and how they override the config.

use super::parse;
use crate::cli::commands::build_benchmark;
use crate::cli::{Cli, CliCommand, RunArgs};
use crate::samples::sleep::SleepResult;
use benchtab_core::config::{BenchConfig, FileOutputConfig, NamingConfig};
use benchtab_core::{NamingPolicy, WriteMode};
use clap::Parser;
use std::path::Path;

fn run_args(args: &[&str]) -> RunArgs {
    match parse(args) {
        CliCommand::Sleep { run, .. } | CliCommand::Pi { run, .. } => run,
        _ => panic!("expected a benchmark command"),
    }
}

#[test]
fn cli_parse_all_run_flags() {
    let run = run_args(&[
        "benchtab",
        "sleep",
        "5",
        "--jobs",
        "4",
        "--no-console",
        "--no-preview",
        "--output-dir",
        "/tmp/results",
        "--overwrite",
        "--file-name",
        "latest.txt",
        "--name",
        "Nap",
    ]);
    assert_eq!(run.jobs, Some(4));
    assert!(run.no_console);
    assert!(run.no_preview);
    assert_eq!(run.output_dir.as_deref(), Some(Path::new("/tmp/results")));
    assert!(run.overwrite);
    assert_eq!(run.file_name.as_deref(), Some("latest.txt"));
    assert_eq!(run.name.as_deref(), Some("Nap"));
}

#[test]
fn cli_file_name_requires_output_dir() {
    let res = Cli::try_parse_from(["benchtab", "sleep", "5", "--file-name", "x.txt"]);
    assert!(res.is_err());
    let res = Cli::try_parse_from(["benchtab", "sleep", "5", "--overwrite"]);
    assert!(res.is_err());
}

#[test]
fn build_benchmark_keeps_config_without_flags() {
    let cfg = BenchConfig {
        max_concurrency: 3,
        ..BenchConfig::default()
    };
    let bench = build_benchmark::<SleepResult>(&cfg, &RunArgs::default()).unwrap();
    assert_eq!(bench.max_concurrency(), 3);
    assert!(bench.file_outputs().is_empty());
}

#[test]
fn build_benchmark_applies_overrides() {
    let cfg = BenchConfig {
        file_outputs: vec![FileOutputConfig {
            folder: "cfg-out".into(),
            mode: WriteMode::Append,
            naming: NamingConfig::Timestamp,
        }],
        ..BenchConfig::default()
    };
    let run = run_args(&[
        "benchtab",
        "sleep",
        "5",
        "--jobs",
        "2",
        "--output-dir",
        "cli-out",
        "--overwrite",
        "--file-name",
        "run.txt",
    ]);
    let bench = build_benchmark::<SleepResult>(&cfg, &run).unwrap();
    assert_eq!(bench.max_concurrency(), 2);

    let outputs = bench.file_outputs();
    assert_eq!(outputs.len(), 2, "config output comes first, then the flag");
    assert_eq!(outputs[0].folder(), Path::new("cfg-out"));
    assert_eq!(outputs[1].folder(), Path::new("cli-out"));
    assert_eq!(outputs[1].mode(), WriteMode::Overwrite);
    assert!(matches!(
        outputs[1].naming(),
        NamingPolicy::FixedName(name) if name == "run.txt"
    ));
}

#[test]
fn build_benchmark_rejects_zero_jobs() {
    let run = run_args(&["benchtab", "sleep", "5", "--jobs", "0"]);
    assert!(build_benchmark::<SleepResult>(&BenchConfig::default(), &run).is_err());
}

#[test]
fn build_benchmark_rejects_empty_file_name() {
    let run = run_args(&["benchtab", "sleep", "5", "--output-dir", "out", "--file-name", ""]);
    assert!(build_benchmark::<SleepResult>(&BenchConfig::default(), &run).is_err());
}

#[tokio::test]
async fn sleep_benchmark_writes_file_table() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let run = run_args(&[
        "benchtab",
        "sleep",
        "1",
        "--no-console",
        "--output-dir",
        out,
        "--file-name",
        "sleep.txt",
    ]);
    let bench = build_benchmark::<SleepResult>(&BenchConfig::default(), &run).unwrap();
    let jobs = vec![
        crate::samples::sleep::SleepJob::new(1, 2),
        crate::samples::sleep::SleepJob::new(2, 1),
    ];
    let results = bench.run(jobs, Some("Sleep")).await.unwrap();
    assert_eq!(results.iter().map(|r| r.id).collect::<Vec<_>>(), [1, 2]);

    let text = std::fs::read_to_string(dir.path().join("sleep.txt")).unwrap();
    assert!(text.starts_with(" << Sleep >>\n"));
    assert!(text.contains(" Job    | Requested     | Measured      | Thread                |\n"));
    assert_eq!(text.lines().count(), 6);
}
