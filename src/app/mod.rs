//! Binary-side orchestration: prompts, progress, output and exit codes.

mod exit_handler;
mod output;
mod progress_manager;
mod runtime;
mod terminal;

pub(crate) use runtime::run_grabber;
pub(crate) use terminal::{init_tracing, resolve_default_log_level};
