//! Error types for the download module.
//!
//! Every variant here is a per-target failure: the engine records it as a
//! `Failed` outcome for that one target and keeps going.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a single target.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request exceeded the configured request timeout.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error (remove stale temp, create, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The worker task ended without reporting (panic or cancellation).
    #[error("fetch task for {url} ended abnormally: {reason}")]
    TaskAborted {
        /// The URL the task was fetching.
        url: String,
        /// Join error text.
        reason: String,
    },
}

/// Coarse failure class used for logging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, DNS failure, timeout, unusable URL.
    Network,
    /// Non-2xx status.
    Http,
    /// Permission denied, disk full, rename failure.
    Filesystem,
    /// The worker itself died.
    Internal,
}

impl FailureKind {
    /// Short lowercase label for log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Http => "http",
            Self::Filesystem => "filesystem",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    ///
    /// Timeouts reported by reqwest are promoted to [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::timeout(url);
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an error for a worker task that ended without an outcome.
    pub fn task_aborted(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TaskAborted {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the failure class of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::InvalidUrl { .. } => {
                FailureKind::Network
            }
            Self::HttpStatus { .. } => FailureKind::Http,
            Self::Io { .. } => FailureKind::Filesystem,
            Self::TaskAborted { .. } => FailureKind::Internal,
        }
    }

    /// Returns true if this error is a request timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path that the source error does not carry.
