//! Run summary: outcome counts, failed URLs, and elapsed time.

use std::time::Duration;

use super::target::FetchOutcome;

/// Final result of one engine run.
///
/// Built incrementally by the engine as outcomes arrive and read-only once
/// returned. `succeeded + skipped + failed` equals the number of input
/// targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    succeeded: usize,
    skipped: usize,
    failed: usize,
    failed_urls: Vec<String>,
    elapsed: Duration,
}

impl RunSummary {
    /// Number of targets downloaded and promoted.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    /// Number of targets skipped because the file already existed.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of targets whose single attempt failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Total number of outcomes recorded.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// URLs of failed targets, in the order their outcomes arrived.
    #[must_use]
    pub fn failed_urls(&self) -> &[String] {
        &self.failed_urls
    }

    /// Wall time from engine start to the last outcome received.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns true if no target failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Single aggregation point the engine feeds outcomes into.
#[derive(Debug, Default)]
pub(crate) struct SummaryBuilder {
    summary: RunSummary,
}

impl SummaryBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, url: &str, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Downloaded { .. } => self.summary.succeeded += 1,
            FetchOutcome::Skipped(_) => self.summary.skipped += 1,
            FetchOutcome::Failed(_) => {
                self.summary.failed += 1;
                self.summary.failed_urls.push(url.to_string());
            }
        }
    }

    pub(crate) fn recorded(&self) -> usize {
        self.summary.total()
    }

    pub(crate) fn finish(mut self, elapsed: Duration) -> RunSummary {
        self.summary.elapsed = elapsed;
        self.summary
    }
}
