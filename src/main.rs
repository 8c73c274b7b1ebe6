//! CLI entry point for the grabber tool.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

mod app;
mod cli;

use cli::Args;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Nothing failed.
    Success,
    /// Some targets failed, others are on disk.
    Partial,
    /// Every target failed, or the run never started.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env values become fallbacks for the env-backed flags below.
    dotenvy::dotenv().ok();

    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    app::init_tracing(app::resolve_default_log_level(args.verbose, args.quiet));
    debug!(?args, "CLI arguments parsed");

    match app::run_grabber(args).await {
        Ok(exit) => ExitCode::from(exit.code()),
        Err(err) => {
            error!(error = %err, "run aborted");
            eprintln!("Error: {err:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}
