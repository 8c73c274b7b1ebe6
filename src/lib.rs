//! Media Grabber Core Library
//!
//! Bulk-fetches the media files listed in an archive catalog export into a
//! local directory, a bounded number at a time, without ever leaving a
//! partially written file under its final name.
//!
//! # Architecture
//!
//! - [`catalog`] - Catalog parsing and URL/destination resolution
//! - [`config`] - Validated run parameters
//! - [`cleanup`] - Destination directory preparation and temp file purging
//! - [`download`] - Fetch engine, atomic writer, per-run summary

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod download;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use catalog::{
    CatalogEntry, CatalogError, CatalogOptions, ResolvedTargets, load_catalog, resolve_targets,
};
pub use cleanup::{CleanupError, prepare, purge_temp_files};
pub use config::{ConfigError, RunConfiguration};
pub use download::{
    DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT, DownloadEngine, DownloadError, DownloadTarget,
    EngineError, FailureKind, FetchOutcome, Fetcher, HttpFetcher, NoopObserver, RunObserver,
    RunSummary, SkipReason, TargetReport,
};
