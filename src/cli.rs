//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use grabber_core::DEFAULT_CONCURRENCY;
use grabber_core::catalog::{DEFAULT_CONTENT_PATH, DEFAULT_EXTENSION, DEFAULT_MEDIA_BASE_URL};

/// Bulk-fetch the media files listed in an archive catalog export.
///
/// Every catalog record with a matching file extension becomes one download.
/// Files already present in the output directory are skipped, so an
/// interrupted run can simply be started again.
#[derive(Parser, Debug)]
#[command(name = "grabber")]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Catalog export (JSON array of records)
    #[arg(long, env = "FILENAME", default_value = "file.json")]
    pub catalog: PathBuf,

    /// Directory the files are written to
    #[arg(short = 'o', long, env = "FOLDER", default_value = "download")]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, env = "CONCURRENCY_LIMIT", default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-request timeout in milliseconds
    #[arg(short = 't', long, env = "TIMEOUT_REQUEST", default_value_t = 40_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,

    /// Delete the output directory before downloading
    #[arg(long, env = "CLEAN_FOLDER", value_parser = clap::builder::BoolishValueParser::new())]
    pub clean: bool,

    /// Media endpoint prefix; record ids are appended to it
    #[arg(long, default_value = DEFAULT_MEDIA_BASE_URL)]
    pub media_base_url: String,

    /// Path between the record id and the file name
    #[arg(long, default_value = DEFAULT_CONTENT_PATH)]
    pub content_path: String,

    /// Only download records whose file name has this extension
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Write the URLs that failed to this file, one per line
    #[arg(long, value_name = "FILE")]
    pub failed_list: Option<PathBuf>,

    /// Do not ask for confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Maintenance commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete partial `.tmp` files left behind by interrupted runs
    PurgeTmp {
        /// Directory to purge
        dir: PathBuf,
    },
}
