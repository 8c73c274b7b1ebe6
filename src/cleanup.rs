//! Destination directory preparation and stale temp file purging.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::RunConfiguration;
use crate::download::TEMP_SUFFIX;

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The destination directory could not be removed.
    #[error("failed to remove destination directory {path}: {source}")]
    Remove {
        /// Directory being removed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The destination directory could not be created.
    #[error("failed to create destination directory {path}: {source}")]
    Create {
        /// Directory being created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be listed or a temp file could not be deleted.
    #[error("IO error purging {path}: {source}")]
    Purge {
        /// Path being read or deleted.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Prepares the destination directory before the engine starts.
///
/// With `clean_before_run`, the directory is removed recursively first; a
/// directory that does not exist counts as removed. Afterwards the directory
/// always exists.
///
/// # Errors
///
/// Returns [`CleanupError::Remove`] or [`CleanupError::Create`]; both are
/// fatal for the run.
#[instrument(skip(config), fields(dir = %config.destination_dir().display(), clean = config.clean_before_run()))]
pub async fn prepare(config: &RunConfiguration) -> Result<(), CleanupError> {
    let dir = config.destination_dir();

    if config.clean_before_run() {
        info!(dir = %dir.display(), "cleaning destination directory");
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("destination directory did not exist");
            }
            Err(source) => {
                return Err(CleanupError::Remove {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| CleanupError::Create {
            path: dir.to_path_buf(),
            source,
        })?;
    debug!("destination directory ready");
    Ok(())
}

/// Deletes every regular file ending in `.tmp` directly inside `dir`.
///
/// Returns the removed paths, sorted. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`CleanupError::Purge`] if the directory cannot be read or a
/// temp file cannot be deleted.
#[instrument(fields(dir = %dir.display()))]
pub async fn purge_temp_files(dir: &Path) -> Result<Vec<PathBuf>, CleanupError> {
    let purge_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| CleanupError::Purge { path, source }
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(purge_error(dir))?;
    let mut removed = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(purge_error(dir))? {
        let path = entry.path();
        let is_temp = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(TEMP_SUFFIX));
        if !is_temp {
            continue;
        }
        let file_type = entry.file_type().await.map_err(purge_error(&path))?;
        if !file_type.is_file() {
            continue;
        }

        tokio::fs::remove_file(&path)
            .await
            .map_err(purge_error(&path))?;
        info!(path = %path.display(), "deleted stale temp file");
        removed.push(path);
    }

    removed.sort();
    Ok(removed)
}
