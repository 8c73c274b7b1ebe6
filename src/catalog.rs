//! Catalog export parsing and target resolution.
//!
//! The catalog is a JSON array of archive records. Each usable record names a
//! media file (`localIdentifier`) attached to a catalog entry (`naId`); the
//! resolver turns those into download URLs and destination paths, dropping
//! records that are incomplete, of the wrong media type, or that would land
//! on a path an earlier record already claimed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::download::DownloadTarget;

/// Default catalog media endpoint.
pub const DEFAULT_MEDIA_BASE_URL: &str = "https://catalog.archives.gov/OpaAPI/media/";

/// Default path between the record id and the media file name.
pub const DEFAULT_CONTENT_PATH: &str = "content/stillpix/255-esd/STS134_LAUNCH_AND_LANDING";

/// Default media file extension to keep.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Errors that prevent the target list from being built.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file does not exist.
    #[error("catalog file {path} does not exist")]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The catalog file exists but could not be read.
    #[error("failed to read catalog file {path}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a JSON array of records.
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        /// Path being parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The media base URL is not an absolute URL.
    #[error("invalid media base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },
}

/// One catalog record. Any field may be absent in the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Catalog record id.
    #[serde(default, deserialize_with = "string_or_number")]
    pub na_id: Option<String>,
    /// Media file name, e.g. `S134-E-000001.jpg`.
    #[serde(default)]
    pub local_identifier: Option<String>,
    /// Human-readable title.
    #[serde(default)]
    pub title: Option<String>,
}

/// How catalog records map to URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Endpoint prefix, ending in `/`.
    pub media_base_url: String,
    /// Path segment(s) between the record id and the file name.
    pub content_path: String,
    /// Extension (without dot) a record's file name must have.
    pub extension: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            content_path: DEFAULT_CONTENT_PATH.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Output of [`resolve_targets`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedTargets {
    /// Targets in catalog order, unique by destination.
    pub targets: Vec<DownloadTarget>,
    /// Records missing a required field.
    pub incomplete: usize,
    /// Records whose file name has a different extension.
    pub filtered: usize,
    /// Records that collapsed onto an earlier destination.
    pub duplicates: usize,
}

/// Reads and parses a catalog export.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the file is missing,
/// [`CatalogError::Read`] for other IO failures and
/// [`CatalogError::Parse`] if it is not a JSON array of records.
#[instrument(fields(path = %path.display()))]
pub async fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(CatalogError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let entries: Vec<CatalogEntry> =
        serde_json::from_slice(&data).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(entries = entries.len(), "catalog loaded");
    Ok(entries)
}

/// Turns catalog records into download targets under `destination_dir`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidBaseUrl`] if `options.media_base_url` is
/// not an absolute URL.
pub fn resolve_targets(
    entries: &[CatalogEntry],
    options: &CatalogOptions,
    destination_dir: &Path,
) -> Result<ResolvedTargets, CatalogError> {
    if Url::parse(&options.media_base_url).is_err() {
        return Err(CatalogError::InvalidBaseUrl {
            url: options.media_base_url.clone(),
        });
    }

    let mut resolved = ResolvedTargets::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for entry in entries {
        let (Some(na_id), Some(local_identifier), Some(_title)) = (
            non_empty(entry.na_id.as_deref()),
            non_empty(entry.local_identifier.as_deref()),
            non_empty(entry.title.as_deref()),
        ) else {
            resolved.incomplete += 1;
            continue;
        };

        let extension = local_identifier.rsplit_once('.').map(|(_, ext)| ext);
        if extension != Some(options.extension.as_str()) {
            resolved.filtered += 1;
            continue;
        }

        let url = media_url(options, na_id, local_identifier);
        let Some(file_name) = basename_from_url(&url) else {
            debug!(%url, "no usable file name in URL");
            resolved.incomplete += 1;
            continue;
        };

        let destination = destination_dir.join(file_name);
        if !claimed.insert(destination.clone()) {
            debug!(%url, path = %destination.display(), "duplicate destination, keeping first");
            resolved.duplicates += 1;
            continue;
        }
        resolved.targets.push(DownloadTarget::new(url, destination));
    }

    info!(
        targets = resolved.targets.len(),
        incomplete = resolved.incomplete,
        filtered = resolved.filtered,
        duplicates = resolved.duplicates,
        "catalog resolved"
    );
    Ok(resolved)
}

/// `{base}{na_id}/{content_path}/{local_identifier}`.
fn media_url(options: &CatalogOptions, na_id: &str, local_identifier: &str) -> String {
    let content_path = options.content_path.trim_matches('/');
    if content_path.is_empty() {
        format!("{}{na_id}/{local_identifier}", options.media_base_url)
    } else {
        format!(
            "{}{na_id}/{content_path}/{local_identifier}",
            options.media_base_url
        )
    }
}

/// Last path segment of `url`, percent-decoded and made safe as a file name.
pub(crate) fn basename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(last).ok()?;
    let name = sanitize_filename(&decoded);
    (!name.trim_matches('_').is_empty() && name != "." && name != "..").then_some(name)
}

/// Replaces path separators and characters invalid on common filesystems.
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Present and not the empty string. Whitespace counts as a value.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}
