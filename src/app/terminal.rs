//! Terminal concerns: tracing setup, progress eligibility, confirmation prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Result, bail};

/// Log level used when `RUST_LOG` is unset.
pub(crate) fn resolve_default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_use_progress(
    stderr_is_terminal: bool,
    quiet: bool,
    dumb_terminal: bool,
) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Asks `question` on stderr and reads the answer from stdin.
///
/// `assume_yes` answers for the user. Without it, a non-interactive stdin is
/// an error rather than a silent "no".
pub(crate) fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        bail!("stdin is not a terminal; pass --yes to run without confirmation");
    }
    let answer = prompt(&mut io::stdin().lock(), &mut io::stderr(), question)?;
    Ok(answer)
}

fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> io::Result<bool> {
    write!(writer, "{question} [y/N] ")?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
