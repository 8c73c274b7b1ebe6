//! Fetch workers: turn one [`DownloadTarget`] into one [`FetchOutcome`].

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::target::{DownloadTarget, FetchOutcome};
use super::writer::{Admission, AtomicFileWriter};
use super::{DownloadError, HttpClient};

/// Performs a single attempt at one target.
///
/// Implementations must never panic or return early without an outcome:
/// every failure, including timeouts, is reported as
/// [`FetchOutcome::Failed`] so the engine can keep processing siblings.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `target` and reports how it ended.
    async fn fetch(&self, target: &DownloadTarget) -> FetchOutcome;
}

/// Fetcher that streams HTTP GET bodies through an [`AtomicFileWriter`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HttpClient,
    writer: AtomicFileWriter,
}

impl HttpFetcher {
    /// Creates a fetcher around a shared client.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            writer: AtomicFileWriter::new(),
        }
    }

    async fn fetch_inner(&self, target: &DownloadTarget) -> Result<FetchOutcome, DownloadError> {
        let slot = match self.writer.begin(target.destination()).await? {
            Admission::Write(slot) => slot,
            Admission::Skip(reason) => return Ok(FetchOutcome::Skipped(reason)),
        };

        let body = self.client.get_stream(target.source_url()).await?;
        let bytes = self.writer.commit(slot, body).await?;
        debug!(bytes, "body promoted to destination");
        Ok(FetchOutcome::Downloaded { bytes })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self, target), fields(url = %target.source_url()))]
    async fn fetch(&self, target: &DownloadTarget) -> FetchOutcome {
        self.fetch_inner(target)
            .await
            .unwrap_or_else(FetchOutcome::Failed)
    }
}
