//! Run configuration shared read-only by the engine and every worker.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::download::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT, MAX_CONCURRENCY, MIN_CONCURRENCY,
};

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Concurrency outside the supported range.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// A zero request timeout would fail every target immediately.
    #[error("invalid request timeout: must be greater than zero")]
    ZeroTimeout,
}

/// Fully resolved settings for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    concurrency_limit: usize,
    request_timeout: Duration,
    clean_before_run: bool,
    destination_dir: PathBuf,
}

impl RunConfiguration {
    /// Builds a configuration, validating the concurrency limit and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] if `concurrency_limit` is
    /// outside 1..=100, or [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn new(
        concurrency_limit: usize,
        request_timeout: Duration,
        clean_before_run: bool,
        destination_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency_limit) {
            return Err(ConfigError::InvalidConcurrency {
                value: concurrency_limit,
            });
        }
        if request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(Self {
            concurrency_limit,
            request_timeout,
            clean_before_run,
            destination_dir: destination_dir.into(),
        })
    }

    /// Default settings writing into `destination_dir`.
    #[must_use]
    pub fn with_defaults(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            clean_before_run: false,
            destination_dir: destination_dir.into(),
        }
    }

    /// Maximum number of fetches in flight.
    #[must_use]
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Hard timeout applied to each request.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether the destination directory is purged before the run.
    #[must_use]
    pub fn clean_before_run(&self) -> bool {
        self.clean_before_run
    }

    /// Directory files are materialized in.
    #[must_use]
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }
}
