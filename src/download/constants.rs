//! Constants for the download module (timeouts, concurrency bounds).

use std::time::Duration;

/// Default HTTP connect timeout (30 seconds), capped by the request timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-request timeout (40 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(40);

/// Default number of concurrent fetches.
pub const DEFAULT_CONCURRENCY: usize = 6;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;
