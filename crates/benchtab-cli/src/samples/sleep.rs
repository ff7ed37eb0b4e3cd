//! Jobs that sleep in small steps and report how far along they are.

use std::time::{Duration, Instant};

use anyhow::Result;
use benchtab_core::{Job, Progress, TableRow, TableSpec};

const STEPS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SleepResult {
    pub id: usize,
    pub requested_ms: u64,
    pub measured: Duration,
    pub thread: String,
}

impl TableRow for SleepResult {
    fn describe(t: &mut TableSpec<Self>) {
        t.default_width(16);
        t.field("id", |r: &SleepResult| r.id).name("Job").order(1).width(8);
        t.field("requested_ms", |r: &SleepResult| r.requested_ms)
            .name("Requested")
            .order(2)
            .format("{0:N0} ms");
        t.field("measured", |r: &SleepResult| r.measured)
            .name("Measured")
            .order(3);
        t.field("thread", |r: &SleepResult| r.thread.clone())
            .name("Thread")
            .width(24);
    }
}

#[derive(Debug, Clone)]
pub struct SleepJob {
    id: usize,
    duration: Duration,
}

impl SleepJob {
    pub fn new(id: usize, ms: u64) -> Self {
        Self {
            id,
            duration: Duration::from_millis(ms),
        }
    }

    fn result(&self, measured: Duration) -> SleepResult {
        SleepResult {
            id: self.id,
            requested_ms: self.duration.as_millis() as u64,
            measured,
            thread: std::thread::current()
                .name()
                .unwrap_or("unnamed")
                .to_string(),
        }
    }
}

impl Job for SleepJob {
    type Output = SleepResult;

    fn execute(&mut self, progress: &Progress<SleepResult>) -> Result<SleepResult> {
        let started = Instant::now();
        let step = self.duration / STEPS;
        for _ in 0..STEPS {
            std::thread::sleep(step);
            progress.report(self.result(started.elapsed()));
        }
        Ok(self.result(started.elapsed()))
    }

    fn supports_preview(&self) -> bool {
        !self.duration.is_zero()
    }
}
