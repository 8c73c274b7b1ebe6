//! Bounded-concurrency fetch engine with atomic file materialization.
//!
//! # Features
//!
//! - Fixed-size worker pool with FIFO admission
//! - Streaming downloads (memory-efficient for large files)
//! - Download-to-`.tmp`-then-rename, so partial files never appear under their final name
//! - Skip-if-exists, making repeated runs idempotent
//! - One outcome per target; failures are counted, never fatal to the batch
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use grabber_core::download::{Fetcher, HttpClient, HttpFetcher, DownloadTarget};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new(HttpClient::new(Duration::from_secs(40))?);
//! let target = DownloadTarget::new("https://example.com/a.jpg", "./download/a.jpg");
//! let outcome = fetcher.fetch(&target).await;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod fetcher;
mod summary;
mod target;
mod writer;

pub use client::HttpClient;
pub use constants::{DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT};
pub use engine::{DownloadEngine, EngineError, NoopObserver, RunObserver, TargetReport};
pub use error::{DownloadError, FailureKind};
pub use fetcher::{Fetcher, HttpFetcher};
pub use summary::RunSummary;
pub use target::{DownloadTarget, FetchOutcome, SkipReason, TEMP_SUFFIX, temp_path_for};
pub use writer::{Admission, AtomicFileWriter, WriteSlot};
