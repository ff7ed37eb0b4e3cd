//! Monte-Carlo estimation of pi.
//!
//! Each job throws `walks` random points into the unit square `runs` times and
//! keeps the estimate closest to pi, the median error, and the average time
//! per repetition.

use std::f64::consts::PI;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use benchtab_core::{Job, Progress, TableRow, TableSpec, Visibility};
use rand::Rng;

use super::median;

#[derive(Debug, Clone, PartialEq)]
pub struct PiResult {
    pub name: String,
    pub best_estimation: f64,
    pub error_min: f64,
    pub error_median: f64,
    /// Average seconds per repetition.
    pub avg_time: f64,
    pub walks: u64,
}

impl TableRow for PiResult {
    fn describe(t: &mut TableSpec<Self>) {
        t.field("name", |r: &PiResult| r.name.clone())
            .name("Name")
            .order(1)
            .width(25);
        t.field("best_estimation", |r: &PiResult| r.best_estimation)
            .name("Best estimation")
            .order(2)
            .width(20);
        t.field("error_min", |r: &PiResult| r.error_min)
            .name("Error min")
            .order(3)
            .width(25);
        t.field("error_median", |r: &PiResult| r.error_median)
            .name("Error median")
            .order(4)
            .width(25);
        t.field("avg_time", |r: &PiResult| r.avg_time)
            .name("Avg time")
            .order(5)
            .width(15)
            .format("{0:N4} s");
        t.field("walks", |r: &PiResult| r.walks)
            .name("Walks")
            .order(6)
            .width(15)
            .format("{0:N0}")
            .show(Visibility::File);
    }
}

#[derive(Debug, Clone)]
pub struct PiJob {
    runs: u32,
    walks: u64,
}

impl PiJob {
    pub fn new(runs: u32, walks: u64) -> Self {
        Self { runs, walks }
    }
}

/// One estimate of pi from `walks` random points.
fn estimate(rng: &mut impl Rng, walks: u64) -> f64 {
    let mut inside = 0u64;
    for _ in 0..walks {
        let x: f64 = rng.gen();
        let y: f64 = rng.gen();
        if x * x + y * y <= 1.0 {
            inside += 1;
        }
    }
    4.0 * inside as f64 / walks as f64
}

impl Job for PiJob {
    type Output = PiResult;

    fn execute(&mut self, progress: &Progress<PiResult>) -> Result<PiResult> {
        ensure!(self.runs > 0, "pi job needs at least one run");
        ensure!(self.walks > 0, "pi job needs at least one walk");

        let mut rng = rand::thread_rng();
        let mut best_estimation = f64::NAN;
        let mut error_min = f64::INFINITY;
        let mut errors = Vec::with_capacity(self.runs as usize);
        let mut total_secs = 0.0;

        for run in 1..=self.runs {
            let started = Instant::now();
            let estimation = estimate(&mut rng, self.walks);
            total_secs += started.elapsed().as_secs_f64();

            let error = (PI - estimation).abs();
            errors.push(error);
            if error < error_min {
                error_min = error;
                best_estimation = estimation;
            }

            if progress.is_enabled() {
                progress.report(PiResult {
                    name: format!("Run {}/{}", run, self.runs),
                    best_estimation,
                    error_min,
                    error_median: median(&errors).unwrap_or(error),
                    avg_time: total_secs / run as f64,
                    walks: self.walks,
                });
            }
        }

        Ok(PiResult {
            name: format!("{} walks", self.walks),
            best_estimation,
            error_min,
            error_median: median(&errors).context("no repetitions ran")?,
            avg_time: total_secs / self.runs as f64,
            walks: self.walks,
        })
    }

    fn supports_preview(&self) -> bool {
        true
    }
}
