//! HTTP client wrapper for streaming GET requests.
//!
//! This module provides the `HttpClient` struct which issues single-attempt
//! GET requests under a hard timeout and hands back the body as a byte
//! stream, never buffering it whole.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::DownloadError;
use super::constants::CONNECT_TIMEOUT;
use crate::user_agent;

/// HTTP client for streaming fetches.
///
/// Created once per run and shared by every worker so connections are
/// pooled. The request timeout covers connect, headers and the whole body.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    request_timeout: Duration,
}

impl HttpClient {
    /// Creates a client whose requests time out after `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend or system
    /// configuration cannot be initialized.
    #[instrument(level = "debug")]
    pub fn new(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
            .timeout(request_timeout)
            .gzip(true)
            .user_agent(user_agent::default_fetch_user_agent())
            .build()?;
        Ok(Self {
            client,
            request_timeout,
        })
    }

    /// Returns the configured per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Sends a GET request and returns the response body as a byte stream.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is invalid
    /// - The request fails or times out before headers arrive
    /// - The server returns a non-2xx status
    ///
    /// Errors while reading the body surface as items of the returned stream.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_stream(
        &self,
        url: &str,
    ) -> Result<impl Stream<Item = Result<impl AsRef<[u8]>, DownloadError>> + Send, DownloadError>
    {
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        debug!(
            status = status.as_u16(),
            content_length = response.content_length(),
            "response headers received"
        );

        let url = url.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(url.as_str(), e))))
    }
}
