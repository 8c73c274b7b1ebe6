//! CLI output formatting and display helpers.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use grabber_core::RunSummary;
use tracing::info;

/// Run parameters shown before the confirmation prompt.
pub(crate) struct ParameterView<'a> {
    pub(crate) catalog: &'a Path,
    pub(crate) output_dir: &'a Path,
    pub(crate) clean: bool,
    pub(crate) timeout_ms: u64,
    pub(crate) concurrency: usize,
}

pub(crate) fn parameter_lines(view: &ParameterView<'_>) -> Vec<String> {
    vec![
        "-- Parameters:".to_string(),
        format!("--     Catalog      : {}", view.catalog.display()),
        format!("--     Folder       : {}", view.output_dir.display()),
        format!(
            "--     Clean folder : {}",
            if view.clean { "yes" } else { "no" }
        ),
        format!("--     Timeout      : {}ms", view.timeout_ms),
        format!("--     Concurrency  : {}", view.concurrency),
    ]
}

pub(crate) fn print_parameters(view: &ParameterView<'_>) {
    for line in parameter_lines(view) {
        eprintln!("{line}");
    }
    eprintln!();
}

/// Formats a duration as whole seconds plus fractional milliseconds, e.g. `3s 41.207ms`.
pub(crate) fn format_split_duration(elapsed: Duration) -> String {
    let millis = f64::from(elapsed.subsec_nanos()) / 1_000_000.0;
    format!("{}s {millis:.3}ms", elapsed.as_secs())
}

pub(crate) fn summary_lines(
    summary: &RunSummary,
    output_dir: &Path,
    entries_in_dir: Option<usize>,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    lines.push(format!(
        "{} downloaded, {} skipped, {} failed ({} total)",
        summary.succeeded(),
        summary.skipped(),
        summary.failed(),
        summary.total()
    ));
    lines.push(format!("{} files could not be downloaded", summary.failed()));
    lines.push(match entries_in_dir {
        Some(count) => format!("{count} files in {}", output_dir.display()),
        None => format!("{} could not be listed", output_dir.display()),
    });
    lines.push(format!("Execution time: {}ms", summary.elapsed().as_millis()));
    lines.push(format!(
        "Execution time (hr): {}",
        format_split_duration(summary.elapsed())
    ));
    lines
}

/// Counts the entries directly inside `dir`.
pub(crate) async fn count_dir_entries(dir: &Path) -> std::io::Result<usize> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut count = 0;
    while entries.next_entry().await?.is_some() {
        count += 1;
    }
    Ok(count)
}

pub(crate) async fn print_summary(summary: &RunSummary, output_dir: &Path) {
    let entries_in_dir = count_dir_entries(output_dir).await.ok();
    println!();
    for line in summary_lines(summary, output_dir, entries_in_dir) {
        println!("{line}");
    }
    if !summary.failed_urls().is_empty() {
        println!();
        println!("Failed URLs:");
        for url in summary.failed_urls() {
            println!("  {url}");
        }
    }
}

/// Writes one failed URL per line. An empty list still truncates the file.
pub(crate) async fn write_failed_list(path: &Path, failed_urls: &[String]) -> Result<()> {
    let mut contents = String::new();
    for url in failed_urls {
        contents.push_str(url);
        contents.push('\n');
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write failed-URL list to {}", path.display()))?;
    info!(path = %path.display(), count = failed_urls.len(), "wrote failed-URL list");
    Ok(())
}
