//! Progress UI (bar) for download runs.

use std::time::Duration;

use grabber_core::{DownloadTarget, RunObserver, RunSummary, TargetReport};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an indicatif bar from engine callbacks. Hidden when disabled.
pub(crate) struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub(crate) fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_bar} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

impl RunObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
    }

    fn on_admitted(&self, _index: usize, _total: usize, target: &DownloadTarget) {
        let name = target
            .destination()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(format!("Grabbing {name}"));
    }

    fn on_outcome(&self, _report: &TargetReport) {
        self.bar.inc(1);
    }

    fn on_finish(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}
