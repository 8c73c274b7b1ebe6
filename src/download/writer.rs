//! Download-to-temp-then-rename file materialization.
//!
//! A body is never streamed under its final name. It goes to
//! `<destination>.tmp` and is renamed onto the destination only after the
//! whole stream has been written and flushed, so a reader of the directory
//! sees either nothing or the complete file. A crash mid-stream leaves a
//! `.tmp` artifact, which the next [`AtomicFileWriter::begin`] for that path
//! removes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures_util::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::DownloadError;
use super::target::{SkipReason, temp_path_for};

/// Result of [`AtomicFileWriter::begin`].
#[derive(Debug)]
pub enum Admission {
    /// Destination is free; stream into this slot.
    Write(WriteSlot),
    /// Nothing to do for this destination.
    Skip(SkipReason),
}

/// A destination that passed the existence check and has no stale temp file.
#[derive(Debug)]
pub struct WriteSlot {
    destination: PathBuf,
    temp: PathBuf,
}

impl WriteSlot {
    /// Final path the file is promoted to.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Temporary path the body is streamed into.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }
}

/// Streams bodies to `.tmp` files and atomically promotes them.
///
/// Stateless; the destination's parent directory must already exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFileWriter;

impl AtomicFileWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks the destination and clears any stale temp file.
    ///
    /// Returns [`Admission::Skip`] when the destination already exists; the
    /// caller must not touch the network in that case.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] if the destination cannot be inspected or
    /// a stale temp file cannot be removed.
    #[instrument(level = "debug", skip(self), fields(destination = %destination.display()))]
    pub async fn begin(&self, destination: &Path) -> Result<Admission, DownloadError> {
        let exists = tokio::fs::try_exists(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;
        if exists {
            debug!("destination already exists");
            return Ok(Admission::Skip(SkipReason::AlreadyExists));
        }

        let temp = temp_path_for(destination);
        match tokio::fs::remove_file(&temp).await {
            Ok(()) => debug!(temp = %temp.display(), "removed stale temp file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(DownloadError::io(temp, e)),
        }

        Ok(Admission::Write(WriteSlot {
            destination: destination.to_path_buf(),
            temp,
        }))
    }

    /// Streams `body` into the slot's temp file and renames it onto the
    /// destination. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the first stream error, or [`DownloadError::Io`] if creating,
    /// writing, flushing or renaming fails. The temp file is removed (best
    /// effort) before returning an error, and the destination is never
    /// created.
    #[instrument(level = "debug", skip(self, slot, body), fields(destination = %slot.destination.display()))]
    pub async fn commit<S, B>(&self, slot: WriteSlot, body: S) -> Result<u64, DownloadError>
    where
        S: Stream<Item = Result<B, DownloadError>>,
        B: AsRef<[u8]>,
    {
        let result = stream_to_temp(&slot.temp, body).await;
        let result = match result {
            Ok(bytes) => tokio::fs::rename(&slot.temp, &slot.destination)
                .await
                .map(|()| bytes)
                .map_err(|e| DownloadError::io(slot.destination.clone(), e)),
            Err(e) => Err(e),
        };

        if result.is_err() {
            debug!(temp = %slot.temp.display(), "cleaning up partial temp file after error");
            let _ = tokio::fs::remove_file(&slot.temp).await;
        }
        result
    }
}

async fn stream_to_temp<S, B>(temp: &Path, body: S) -> Result<u64, DownloadError>
where
    S: Stream<Item = Result<B, DownloadError>>,
    B: AsRef<[u8]>,
{
    let file = File::create(temp)
        .await
        .map_err(|e| DownloadError::io(temp, e))?;
    let mut writer = BufWriter::new(file);
    let mut body = std::pin::pin!(body);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let chunk = chunk.as_ref();
        writer
            .write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(temp, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(temp, e))?;

    Ok(bytes_written)
}
