//! Jobs and result types shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use benchtab_core::{Job, Progress, TableRow, TableSpec, Visibility};

/// Result of a [`SleepJob`].
#[derive(Debug, Clone, PartialEq)]
pub struct SleepResult {
    pub id: usize,
    pub slept_ms: u64,
    pub note: String,
}

impl TableRow for SleepResult {
    fn describe(t: &mut TableSpec<Self>) {
        t.default_width(10);
        t.field("id", |r: &SleepResult| r.id).name("Job").order(1);
        t.field("slept_ms", |r: &SleepResult| r.slept_ms)
            .name("Slept")
            .order(2)
            .format("{0:N0} ms")
            .width(12);
        t.field("note", |r: &SleepResult| r.note.clone())
            .name("Note")
            .order(3)
            .show(Visibility::File);
    }
}

/// Counters shared by every job of a test run.
#[derive(Debug, Default)]
pub struct Tracker {
    pub running: AtomicUsize,
    pub peak: AtomicUsize,
    pub started: AtomicUsize,
    pub finished: Mutex<Vec<usize>>,
}

impl Tracker {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<usize> {
        self.finished.lock().unwrap().clone()
    }
}

/// Sleeps for a fixed time; optionally fails, panics or reports previews.
pub struct SleepJob {
    pub id: usize,
    pub sleep: Duration,
    pub fail: bool,
    pub panic: bool,
    pub previews: usize,
    pub tracker: Arc<Tracker>,
}

impl SleepJob {
    pub fn new(id: usize, ms: u64, tracker: &Arc<Tracker>) -> Self {
        Self {
            id,
            sleep: Duration::from_millis(ms),
            fail: false,
            panic: false,
            previews: 0,
            tracker: Arc::clone(tracker),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    pub fn with_previews(mut self, n: usize) -> Self {
        self.previews = n;
        self
    }

    fn result(&self, note: &str) -> SleepResult {
        SleepResult {
            id: self.id,
            slept_ms: self.sleep.as_millis() as u64,
            note: note.to_string(),
        }
    }
}

impl Job for SleepJob {
    type Output = SleepResult;

    fn execute(&mut self, progress: &Progress<SleepResult>) -> anyhow::Result<SleepResult> {
        let t = &self.tracker;
        t.started.fetch_add(1, Ordering::SeqCst);
        let now = t.running.fetch_add(1, Ordering::SeqCst) + 1;
        t.peak.fetch_max(now, Ordering::SeqCst);

        for step in 0..self.previews {
            progress.report(self.result(&format!("step {}", step)));
        }
        std::thread::sleep(self.sleep);

        t.running.fetch_sub(1, Ordering::SeqCst);
        t.finished.lock().unwrap().push(self.id);

        if self.panic {
            panic!("job {} blew up", self.id);
        }
        if self.fail {
            anyhow::bail!("job {} failed on purpose", self.id);
        }
        Ok(self.result("done"))
    }

    fn supports_preview(&self) -> bool {
        self.previews > 0
    }
}

pub fn sleep_jobs(durations_ms: &[u64], tracker: &Arc<Tracker>) -> Vec<SleepJob> {
    durations_ms
        .iter()
        .enumerate()
        .map(|(id, &ms)| SleepJob::new(id, ms, tracker))
        .collect()
}
