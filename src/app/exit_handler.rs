//! Exit code logic for the grabber process.
//!
//! Single responsibility: map run counts to the process exit outcome.

use grabber_core::RunSummary;

use crate::ProcessExit;

/// Determines the process exit outcome from a finished run.
///
/// Skipped targets count as completed: the file is on disk either way.
pub(crate) fn determine_exit_outcome(summary: &RunSummary) -> ProcessExit {
    exit_outcome_from_counts(summary.succeeded() + summary.skipped(), summary.failed())
}

fn exit_outcome_from_counts(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
