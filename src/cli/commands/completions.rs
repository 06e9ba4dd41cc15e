//! Completions command implementation.
//!
//! This module implements the `cat-roulette completions` command for
//! generating shell completions.

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Result type for completions command operations.
pub type CompletionsCommandResult = Result<(), CompletionsCommandError>;

/// Error type for completions command operations.
#[derive(Debug, thiserror::Error)]
pub enum CompletionsCommandError {
    /// The specified shell is not supported for completions.
    #[error("Unsupported shell: {0}")]
    UnsupportedShell(String),
}

fn parse_shell(shell: &str) -> Result<Shell, CompletionsCommandError> {
    match shell {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(CompletionsCommandError::UnsupportedShell(shell.to_string())),
    }
}

/// Execute the completions command.
pub fn completions(shell: &str) -> CompletionsCommandResult {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "cat-roulette", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_command_error_display() {
        let err = CompletionsCommandError::UnsupportedShell("powershell".to_string());
        assert!(err.to_string().contains("Unsupported shell"));
        assert!(err.to_string().contains("powershell"));
    }

    #[test]
    fn test_parse_known_shells() {
        assert_eq!(parse_shell("zsh").unwrap(), Shell::Zsh);
        assert!(parse_shell("tcsh").is_err());
    }
}
