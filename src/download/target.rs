//! Download targets and the terminal outcome of fetching one.

use std::fmt;
use std::path::{Path, PathBuf};

use super::DownloadError;

/// Suffix appended to a destination path while its body is being streamed.
pub const TEMP_SUFFIX: &str = ".tmp";

/// One remote URL and the local path it is saved under.
///
/// The destination path is the identity of a target: no two targets in a
/// run may share one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    source_url: String,
    destination: PathBuf,
}

impl DownloadTarget {
    /// Creates a target.
    pub fn new(source_url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            destination: destination.into(),
        }
    }

    /// The URL fetched for this target.
    #[must_use]
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Final path of the materialized file.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path the body is streamed to before promotion (`<destination>.tmp`).
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        temp_path_for(&self.destination)
    }
}

/// Returns `<path>.tmp` for a destination path.
#[must_use]
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Why a target was not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A file already exists at the destination path.
    AlreadyExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => f.write_str("already exists"),
        }
    }
}

/// Terminal result of attempting one target. Produced exactly once per target.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The body was written and promoted to the destination path.
    Downloaded {
        /// Bytes written to disk.
        bytes: u64,
    },
    /// Nothing was fetched.
    Skipped(SkipReason),
    /// The single attempt failed.
    Failed(DownloadError),
}

impl FetchOutcome {
    /// Returns true for [`FetchOutcome::Downloaded`].
    #[must_use]
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    /// Returns true for [`FetchOutcome::Skipped`].
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns the error for [`FetchOutcome::Failed`].
    #[must_use]
    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl From<Result<u64, DownloadError>> for FetchOutcome {
    fn from(result: Result<u64, DownloadError>) -> Self {
        match result {
            Ok(bytes) => Self::Downloaded { bytes },
            Err(error) => Self::Failed(error),
        }
    }
}
