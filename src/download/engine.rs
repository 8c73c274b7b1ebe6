//! Download engine: runs targets through a bounded worker pool.
//!
//! This module provides the `DownloadEngine` which coordinates concurrent
//! fetches using a semaphore-based concurrency control pattern. Targets are
//! admitted in input order as permits free up; outcomes are aggregated in a
//! single loop as they complete, in whatever order that is.
//!
//! # Example
//!
//! ```no_run
//! use grabber_core::{DownloadEngine, DownloadTarget, RunConfiguration};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfiguration::with_defaults("./download");
//! let engine = DownloadEngine::new(&config)?;
//! let targets = vec![DownloadTarget::new(
//!     "https://example.com/a.jpg",
//!     "./download/a.jpg",
//! )];
//! let summary = engine.run(targets).await?;
//! println!("ok: {}, skipped: {}, failed: {}", summary.succeeded(), summary.skipped(), summary.failed());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tracing::{debug, info, instrument, warn};

use super::fetcher::{Fetcher, HttpFetcher};
use super::summary::{RunSummary, SummaryBuilder};
use super::target::{DownloadTarget, FetchOutcome};
use super::{DownloadError, HttpClient};
use crate::config::{ConfigError, RunConfiguration};
use crate::download::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};

/// Error type for failures that stop a run as a whole.
///
/// Individual target failures never surface here; they are counted in the
/// returned [`RunSummary`].
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid engine settings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// One aggregated outcome, as handed to a [`RunObserver`].
#[derive(Debug)]
pub struct TargetReport {
    /// Zero-based position of the target in the input.
    pub index: usize,
    /// Number of targets in the run.
    pub total: usize,
    /// The target.
    pub target: DownloadTarget,
    /// How it ended.
    pub outcome: FetchOutcome,
}

/// Hooks for progress rendering. All methods default to no-ops.
///
/// Called from the engine's aggregation loop, never from worker tasks.
pub trait RunObserver: Send + Sync {
    /// The run is starting with `total` targets.
    fn on_start(&self, _total: usize) {}

    /// A target took a pool slot.
    fn on_admitted(&self, _index: usize, _total: usize, _target: &DownloadTarget) {}

    /// A target produced its outcome.
    fn on_outcome(&self, _report: &TargetReport) {}

    /// Every target has produced its outcome.
    fn on_finish(&self, _summary: &RunSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Download engine for bounded-concurrency batch fetches.
///
/// # Concurrency Model
///
/// - Each fetch runs in its own Tokio task inside a `JoinSet`
/// - A semaphore permit is acquired before a target is admitted, in input order
/// - Permits are released automatically when a fetch completes (RAII)
/// - Outcomes are aggregated only by the loop that owns the `JoinSet`
///
/// A failed target never stops the batch; the run ends when every target has
/// produced exactly one outcome.
pub struct DownloadEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
    /// Worker shared by every task.
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("concurrency", &self.concurrency)
            .field("available_permits", &self.semaphore.available_permits())
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates an engine that fetches over HTTP with the configured
    /// concurrency limit and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(config), fields(concurrency = config.concurrency_limit()))]
    pub fn new(config: &RunConfiguration) -> Result<Self, EngineError> {
        let client = HttpClient::new(config.request_timeout()).map_err(EngineError::ClientBuild)?;
        debug!(
            timeout_ms = config.request_timeout().as_millis(),
            "creating download engine"
        );
        Self::with_fetcher(config.concurrency_limit(), Arc::new(HttpFetcher::new(client)))
    }

    /// Creates an engine around any [`Fetcher`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `concurrency` is outside 1..=100.
    pub fn with_fetcher(concurrency: usize, fetcher: Arc<dyn Fetcher>) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::InvalidConcurrency { value: concurrency }.into());
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            fetcher,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches every target and returns the summary.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    /// Individual fetch failures do NOT cause this method to error.
    pub async fn run(&self, targets: Vec<DownloadTarget>) -> Result<RunSummary, EngineError> {
        self.run_observed(targets, &NoopObserver).await
    }

    /// Same as [`run`](Self::run), reporting progress to `observer`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, targets, observer), fields(targets = targets.len(), concurrency = self.concurrency))]
    pub async fn run_observed(
        &self,
        targets: Vec<DownloadTarget>,
        observer: &dyn RunObserver,
    ) -> Result<RunSummary, EngineError> {
        let started = Instant::now();
        let total = targets.len();
        let mut summary = SummaryBuilder::new();
        let mut elapsed = Duration::ZERO;

        let mut pending = targets.into_iter().enumerate();
        let mut next = pending.next();
        let mut in_flight: JoinSet<(usize, DownloadTarget, FetchOutcome)> = JoinSet::new();
        let mut admitted: HashMap<Id, (usize, DownloadTarget)> = HashMap::new();

        info!(total, "starting batch");
        observer.on_start(total);

        loop {
            tokio::select! {
                permit = Arc::clone(&self.semaphore).acquire_owned(), if next.is_some() => {
                    let permit = permit.map_err(|_| EngineError::SemaphoreClosed)?;
                    let Some((index, target)) = next.take() else {
                        continue;
                    };
                    next = pending.next();

                    debug!(index = index + 1, total, url = %target.source_url(), "admitting target");
                    observer.on_admitted(index, total, &target);

                    let fetcher = Arc::clone(&self.fetcher);
                    let task_target = target.clone();
                    let handle = in_flight.spawn(async move {
                        // Permit is dropped when this block exits (RAII)
                        let _permit = permit;
                        let outcome = fetcher.fetch(&task_target).await;
                        (index, task_target, outcome)
                    });
                    admitted.insert(handle.id(), (index, target));
                }
                Some(joined) = in_flight.join_next_with_id() => {
                    let (index, target, outcome) = match joined {
                        Ok((id, report)) => {
                            admitted.remove(&id);
                            report
                        }
                        Err(join_error) => {
                            let Some((index, target)) = admitted.remove(&join_error.id()) else {
                                warn!(error = %join_error, "unknown fetch task ended abnormally");
                                continue;
                            };
                            warn!(url = %target.source_url(), error = %join_error, "fetch task panicked");
                            let error = DownloadError::task_aborted(
                                target.source_url(),
                                join_error.to_string(),
                            );
                            (index, target, FetchOutcome::Failed(error))
                        }
                    };

                    log_outcome(index, total, &target, &outcome);
                    summary.record(target.source_url(), &outcome);
                    elapsed = started.elapsed();
                    observer.on_outcome(&TargetReport {
                        index,
                        total,
                        target,
                        outcome,
                    });
                }
                else => break,
            }
        }

        debug_assert_eq!(summary.recorded(), total, "every target yields one outcome");
        let summary = summary.finish(elapsed);
        info!(
            succeeded = summary.succeeded(),
            skipped = summary.skipped(),
            failed = summary.failed(),
            total,
            elapsed_ms = summary.elapsed().as_millis(),
            "batch complete"
        );
        observer.on_finish(&summary);
        Ok(summary)
    }
}

fn log_outcome(index: usize, total: usize, target: &DownloadTarget, outcome: &FetchOutcome) {
    let position = index + 1;
    match outcome {
        FetchOutcome::Downloaded { bytes } => info!(
            position,
            total,
            bytes,
            path = %target.destination().display(),
            "file downloaded"
        ),
        FetchOutcome::Skipped(reason) => info!(
            position,
            total,
            %reason,
            path = %target.destination().display(),
            "file skipped"
        ),
        FetchOutcome::Failed(error) => warn!(
            position,
            total,
            url = %target.source_url(),
            kind = %error.kind(),
            error = %error,
            "download failed"
        ),
    }
}
