//! Benchmark execution: run jobs under a concurrency cap and render the table.
//!
//! Flow of one run:
//! open sinks → header → reserve preview rows → run jobs (at most
//! `max_concurrency` at once, previews rendered as they arrive) → print all
//! rows in submission order → flush and close → restore the cursor.
//!
//! A failing job aborts the run; no rows are printed in that case.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::BenchConfig;
use crate::error::{BenchError, ConfigError};
use crate::job::{Job, Progress};
use crate::preview::PreviewRenderer;
use crate::schema::{schema_of, TableRow};
use crate::sink::{FileOutput, NamingPolicy, Sink, WriteMode};
use crate::table::TableRenderer;
use crate::terminal::Terminal;

/// Result slots indexed by submission order.
type Slots<R> = Arc<Mutex<Vec<Option<R>>>>;

/// Runs jobs producing `R` and renders their results as a table.
pub struct Benchmark<R> {
    console: bool,
    preview: bool,
    max_concurrency: usize,
    file_outputs: Vec<FileOutput>,
    terminal: Option<Terminal>,
    _row: PhantomData<fn() -> R>,
}

impl<R> std::fmt::Debug for Benchmark<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Benchmark")
            .field("console", &self.console)
            .field("preview", &self.preview)
            .field("max_concurrency", &self.max_concurrency)
            .field("file_outputs", &self.file_outputs)
            .finish_non_exhaustive()
    }
}

impl<R: TableRow> Default for Benchmark<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TableRow> Benchmark<R> {
    /// Console output with preview, sequential execution, no file outputs.
    pub fn new() -> Self {
        Self {
            console: true,
            preview: true,
            max_concurrency: 1,
            file_outputs: Vec::new(),
            terminal: None,
            _row: PhantomData,
        }
    }

    /// Build from the global config; every file output entry is validated.
    pub fn from_config(cfg: &BenchConfig) -> Result<Self, ConfigError> {
        let mut bench = Self::new()
            .with_console(cfg.console_output)
            .with_preview(cfg.console_preview)
            .with_max_concurrency(cfg.max_concurrency)?;
        for entry in &cfg.file_outputs {
            bench.file_outputs.push(entry.to_output()?);
        }
        Ok(bench)
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Live preview rows. Only takes effect on an interactive console.
    pub fn with_preview(mut self, enabled: bool) -> Self {
        self.preview = enabled;
        self
    }

    /// Hard upper bound on jobs running at once; 1 runs them sequentially.
    pub fn with_max_concurrency(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        self.max_concurrency = limit;
        Ok(self)
    }

    /// Console used instead of stdout.
    pub fn with_terminal(mut self, terminal: Terminal) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Register a file destination. Naming errors are reported here, before
    /// any job runs.
    pub fn add_file_output(
        &mut self,
        folder: impl Into<std::path::PathBuf>,
        mode: WriteMode,
        naming: NamingPolicy,
    ) -> Result<&mut Self, ConfigError> {
        let output = FileOutput::new(folder, mode, naming)?;
        self.file_outputs.push(output);
        Ok(self)
    }

    pub fn push_file_output(&mut self, output: FileOutput) -> &mut Self {
        self.file_outputs.push(output);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn file_outputs(&self) -> &[FileOutput] {
        &self.file_outputs
    }

    /// Run `jobs` and return their results in submission order.
    ///
    /// The schema of `R` is derived (or taken from the cache) before any sink
    /// is opened, so schema errors never leave partial output behind.
    pub async fn run<J>(&self, jobs: Vec<J>, name: Option<&str>) -> Result<Vec<R>, BenchError>
    where
        J: Job<Output = R>,
    {
        let schema = schema_of::<R>()?;
        let renderer = TableRenderer::new(schema);
        let started = Instant::now();

        let terminal = self
            .console
            .then(|| self.terminal.clone().unwrap_or_else(Terminal::stdout));

        let mut sinks = Vec::with_capacity(self.file_outputs.len() + 1);
        for output in &self.file_outputs {
            sinks.push(Sink::File(output.open()?));
        }
        if let Some(terminal) = &terminal {
            sinks.push(Sink::Console(terminal.clone()));
        }

        let _cursor = match &terminal {
            Some(t) if t.is_interactive() => Some(t.hide_cursor()?),
            _ => None,
        };
        let preview = terminal
            .filter(|t| self.preview && t.is_interactive())
            .map(|t| PreviewRenderer::new(renderer.clone(), t));

        tracing::info!(
            name = name.unwrap_or(""),
            jobs = jobs.len(),
            max_concurrency = self.max_concurrency,
            sinks = sinks.len(),
            preview = preview.is_some(),
            "benchmark started"
        );

        let reserved = jobs.len();
        renderer.print_header(name, &mut sinks)?;
        if let Some(preview) = &preview {
            preview.reserve(reserved)?;
        }

        let results = match self.execute_all(jobs, preview.as_ref()).await {
            Ok(results) => results,
            Err(err) => {
                tracing::error!("benchmark aborted: {}", err);
                // Later output starts below the preview rows instead of on them.
                if let Some(preview) = &preview {
                    if let Err(io_err) = preview.skip_reserved(reserved) {
                        tracing::warn!("could not move past preview rows: {}", io_err);
                    }
                }
                return Err(err);
            }
        };

        for result in &results {
            if preview.is_some() {
                if let Some(Sink::Console(t)) = sinks.last() {
                    t.clear_line()?;
                }
            }
            renderer.print_row(result, &mut sinks)?;
        }
        for sink in sinks.iter_mut() {
            std::io::Write::flush(sink)?;
        }

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            results = results.len(),
            "benchmark finished"
        );
        Ok(results)
    }

    /// Run every job with at most `max_concurrency` in flight, refilling free
    /// slots from the queue in submission order.
    async fn execute_all<J>(
        &self,
        jobs: Vec<J>,
        preview: Option<&PreviewRenderer<R>>,
    ) -> Result<Vec<R>, BenchError>
    where
        J: Job<Output = R>,
    {
        let total = jobs.len();
        let slots: Slots<R> = Arc::new(Mutex::new((0..total).map(|_| None).collect()));
        let mut queue = jobs.into_iter().enumerate();
        let mut join_set = JoinSet::new();

        loop {
            while join_set.len() < self.max_concurrency {
                let Some((index, job)) = queue.next() else {
                    break;
                };
                let slots = Arc::clone(&slots);
                let preview = preview.cloned();
                join_set.spawn(run_job(index, job, slots, preview));
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            // Dropping the set on error aborts the jobs still waiting on it.
            joined??;
        }

        let slots = match Arc::try_unwrap(slots) {
            Ok(m) => m.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(arc) => {
                let mut guard = arc.lock().unwrap_or_else(PoisonError::into_inner);
                std::mem::take(&mut *guard)
            }
        };
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| BenchError::Job {
                    index,
                    source: anyhow!("job finished without a result"),
                })
            })
            .collect()
    }
}

/// Execute one job on a blocking thread, render its previews, and store its
/// result at `index`.
async fn run_job<J>(
    index: usize,
    mut job: J,
    slots: Slots<J::Output>,
    preview: Option<PreviewRenderer<J::Output>>,
) -> Result<(), BenchError>
where
    J: Job,
{
    let (progress, listener) = match &preview {
        Some(renderer) if job.supports_preview() => {
            let (progress, rx) = Progress::channel();
            (progress, Some(listen(rx, renderer.clone(), index)))
        }
        _ => (Progress::disabled(), None),
    };

    tracing::debug!(job = index, "job started");
    let started = Instant::now();
    let execution = tokio::task::spawn_blocking(move || {
        let result = job.execute(&progress);
        drop(progress);
        result
    });
    // The listener ends once the job drops its progress handle, so every
    // preview is drawn before the final row below.
    let (joined, listened) = tokio::join!(execution, async {
        match listener {
            Some(listener) => listener.await,
            None => Ok(()),
        }
    });

    let result = match joined {
        Ok(Ok(result)) => result,
        Ok(Err(source)) => {
            tracing::warn!(job = index, "job failed: {:#}", source);
            return Err(BenchError::Job { index, source });
        }
        Err(join_err) => {
            tracing::warn!(job = index, "job panicked: {}", join_err);
            return Err(BenchError::Job {
                index,
                source: anyhow!("job panicked: {}", join_err),
            });
        }
    };
    listened?;
    tracing::debug!(
        job = index,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "job completed"
    );

    if let Some(renderer) = &preview {
        renderer.preview_row(&result, index)?;
    }
    slots.lock().unwrap_or_else(PoisonError::into_inner)[index] = Some(result);
    Ok(())
}

/// Draw each reported result on the job's reserved row until the job finishes.
async fn listen<R>(
    mut rx: mpsc::UnboundedReceiver<R>,
    renderer: PreviewRenderer<R>,
    index: usize,
) -> std::io::Result<()> {
    while let Some(partial) = rx.recv().await {
        renderer.preview_row(&partial, index)?;
    }
    Ok(())
}
