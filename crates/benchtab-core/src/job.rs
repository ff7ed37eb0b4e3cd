//! The job capability interface.
//!
//! A job produces one final result. Jobs that also want to show progress
//! report intermediate results through the [`Progress`] handle passed to
//! [`Job::execute`]; the engine only listens when [`Job::supports_preview`]
//! is true for that instance.

use tokio::sync::mpsc;

use crate::schema::TableRow;

/// A unit of benchmark work. Runs on a blocking worker thread, so it may
/// block or spin for as long as it needs.
pub trait Job: Send + 'static {
    type Output: TableRow;

    /// Run the job to completion. An error aborts the whole run.
    fn execute(&mut self, progress: &Progress<Self::Output>) -> anyhow::Result<Self::Output>;

    /// Whether this instance reports intermediate results.
    fn supports_preview(&self) -> bool {
        false
    }
}

/// Sending half of a job's preview channel.
#[derive(Debug)]
pub struct Progress<R> {
    tx: Option<mpsc::UnboundedSender<R>>,
}

impl<R> Progress<R> {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<R>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A handle that drops every report.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Whether reports are rendered. Jobs may skip building previews otherwise.
    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Report an intermediate result. Never blocks; dropped if nobody listens.
    pub fn report(&self, partial: R) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(partial);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_progress_drops_reports() {
        let progress = Progress::<u32>::disabled();
        assert!(!progress.is_enabled());
        progress.report(1);
    }

    #[test]
    fn channel_delivers_in_order() {
        let (progress, mut rx) = Progress::channel();
        assert!(progress.is_enabled());
        progress.report(1);
        progress.report(2);
        drop(progress);
        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_receiver_disables_progress() {
        let (progress, rx) = Progress::<u32>::channel();
        drop(rx);
        assert!(!progress.is_enabled());
        progress.report(5);
    }
}
