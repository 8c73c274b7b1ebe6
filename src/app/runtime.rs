use std::io::{self, IsTerminal};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use grabber_core::{
    CatalogOptions, DownloadEngine, RunConfiguration, load_catalog, prepare, purge_temp_files,
    resolve_targets,
};
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{exit_handler, output, progress_manager::ProgressObserver, terminal};
use crate::cli::{Args, Command};

pub(crate) async fn run_grabber(args: Args) -> Result<ProcessExit> {
    if let Some(Command::PurgeTmp { dir }) = &args.command {
        return run_purge(dir, args.yes).await;
    }

    let config = RunConfiguration::new(
        usize::from(args.concurrency),
        Duration::from_millis(args.timeout_ms),
        args.clean,
        &args.output_dir,
    )?;

    if !args.quiet {
        output::print_parameters(&output::ParameterView {
            catalog: &args.catalog,
            output_dir: config.destination_dir(),
            clean: config.clean_before_run(),
            timeout_ms: args.timeout_ms,
            concurrency: config.concurrency_limit(),
        });
    }
    if !terminal::confirm("Settings are correct?", args.yes)? {
        eprintln!("Bye, see you soon!");
        return Ok(ProcessExit::Success);
    }

    // Catalog errors must surface before --clean touches the folder.
    let entries = load_catalog(&args.catalog).await?;
    let options = CatalogOptions {
        media_base_url: args.media_base_url.clone(),
        content_path: args.content_path.clone(),
        extension: args.extension.clone(),
    };
    let resolved = resolve_targets(&entries, &options, config.destination_dir())?;
    if resolved.incomplete > 0 {
        warn!(count = resolved.incomplete, "skipped incomplete catalog records");
    }

    prepare(&config).await?;

    let total = resolved.targets.len();
    info!(total, "starting grabber");
    if !args.quiet {
        println!("{total} files found, starting grabber ...");
    }

    let engine = DownloadEngine::new(&config)?;
    debug!(?engine, "engine ready");
    let observer = ProgressObserver::new(terminal::should_use_progress(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    ));
    let summary = engine.run_observed(resolved.targets, &observer).await?;

    if !args.quiet {
        output::print_summary(&summary, config.destination_dir()).await;
    }
    if let Some(path) = &args.failed_list {
        output::write_failed_list(path, summary.failed_urls()).await?;
    }

    Ok(exit_handler::determine_exit_outcome(&summary))
}

async fn run_purge(dir: &Path, assume_yes: bool) -> Result<ProcessExit> {
    let question = format!("Delete every *.tmp file in {}?", dir.display());
    if !terminal::confirm(&question, assume_yes)? {
        eprintln!("Aborted");
        return Ok(ProcessExit::Failure);
    }

    let removed = purge_temp_files(dir).await?;
    for path in &removed {
        println!("> Deleted {}", path.display());
    }
    println!("{} temp files removed", removed.len());
    Ok(ProcessExit::Success)
}
