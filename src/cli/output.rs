//! Shared output helpers for CLI commands.

use std::io::{self, Write};

use serde::Serialize;

use crate::runner::{RunResult, StopReason};

/// Error type for output operations.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// Failed to serialise the value.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to write to stdout.
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), OutputError> {
    let text = serde_json::to_string_pretty(value)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

/// Format seconds as `1m 05s` or `4.2s`.
pub fn format_duration(seconds: f64) -> String {
    if seconds >= 60.0 {
        let whole = seconds as u64;
        format!("{}m {:02}s", whole / 60, whole % 60)
    } else {
        format!("{seconds:.1}s")
    }
}

/// Summary lines printed after a batch of spins.
pub fn run_summary(result: &RunResult) -> Vec<String> {
    let colour = match result.stop_reason {
        StopReason::Complete => "\x1b[32m",
        StopReason::UserInterrupt => "\x1b[33m",
        StopReason::EmptyCatalog => "\x1b[31m",
    };
    let mut lines = vec![format!(
        "{colour}{}\x1b[0m \x1b[2m({} spins in {})\x1b[0m",
        result.stop_reason,
        result.spins_completed,
        format_duration(result.duration_seconds)
    )];
    if result.degraded_results > 0 {
        lines.push(format!(
            "  \x1b[33m{} result(s) shown without their image\x1b[0m",
            result.degraded_results
        ));
    }
    if result.render_failures > 0 {
        lines.push(format!(
            "  \x1b[31m{} result(s) could not be displayed\x1b[0m",
            result.render_failures
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(4.24), "4.2s");
        assert_eq!(format_duration(65.0), "1m 05s");
    }

    #[test]
    fn test_run_summary_mentions_degraded_results() {
        let result = RunResult {
            spins_completed: 3,
            winners: vec![1, 4, 2],
            degraded_results: 1,
            render_failures: 0,
            stop_reason: StopReason::Complete,
            duration_seconds: 10.5,
        };
        let lines = run_summary(&result);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("All spins completed"));
        assert!(lines[0].contains("3 spins in 10.5s"));
        assert!(lines[1].contains("1 result(s) shown without their image"));
    }
}
