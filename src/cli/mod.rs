//! CLI commands and argument handling.
//!
//! This module contains the clap CLI definitions and dispatches to the
//! command implementations in [`commands`].

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

/// Result type returned by every command.
pub type CliResult = anyhow::Result<ExitCode>;

/// Spin the wheel, get a cat.
///
/// Picks a random item from a wheel of cats, animates the spin and shows the
/// winner's picture (or a stand-in when the picture cannot be loaded).
#[derive(Parser, Debug)]
#[command(name = "cat-roulette")]
#[command(author, version = crate::VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of .roulette/config.json.
    #[arg(long, global = true, value_name = "PATH", env = "CAT_ROULETTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run; prints a quick start when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spin the wheel and print the results.
    ///
    /// Examples:
    ///   cat-roulette spin                 # One spin
    ///   cat-roulette spin -n 5            # Five spins in a row
    ///   cat-roulette spin --seed 42       # Reproducible spin
    Spin(SpinCommand),

    /// Open the interactive wheel.
    ///
    /// Space or Enter spins, r retries images that failed to load, q quits.
    Play(PlayCommand),

    /// Load every image and report which ones are missing.
    Preload(PreloadCommand),

    /// List the items on the wheel.
    Catalog(CatalogCommand),

    /// Write a default configuration file.
    Init(InitCommand),

    /// Manage configuration.
    ///
    /// View, set, and understand config parameters without editing JSON directly.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions.
    ///
    /// Outputs completion script to stdout for bash, zsh, or fish.
    Completions(CompletionsCommand),
}

/// Arguments for the 'spin' command.
#[derive(Args, Debug)]
pub struct SpinCommand {
    /// Number of spins to run.
    #[arg(short = 'n', long, default_value = "1")]
    pub count: u32,

    /// Seed for reproducible spins.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the spin duration in milliseconds.
    #[arg(long, value_name = "MS")]
    pub duration_ms: Option<u64>,

    /// Skip preloading images before the first spin.
    #[arg(long)]
    pub no_preload: bool,

    /// Feedback display mode (overrides feedback.mode).
    #[arg(long, value_parser = ["full", "minimal", "off"])]
    pub feedback: Option<String>,
}

/// Arguments for the 'play' command.
#[derive(Args, Debug)]
pub struct PlayCommand {
    /// Seed for reproducible spins.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the 'preload' command.
#[derive(Args, Debug)]
pub struct PreloadCommand {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the 'catalog' command.
#[derive(Args, Debug)]
pub struct CatalogCommand {
    /// Print the catalog as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the 'init' command.
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Overwrite existing config.
    #[arg(short = 'f', long)]
    pub force: bool,
}

/// Subcommands for config management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show all configuration values.
    Show(ConfigShowCommand),

    /// Get a specific config value.
    ///
    /// Use dot notation for nested keys (e.g., wheel.spin_duration_ms).
    Get(ConfigGetCommand),

    /// Set a config value.
    ///
    /// Use dot notation for keys. Values are validated before saving.
    Set(ConfigSetCommand),

    /// Reset config to defaults.
    ///
    /// Can reset a specific key, a section, or all config.
    Reset(ConfigResetCommand),

    /// Show documentation for config keys.
    ///
    /// Displays description, type, default value, and examples.
    Explain(ConfigExplainCommand),

    /// List all valid config keys.
    Keys,
}

/// Arguments for 'config show' command.
#[derive(Args, Debug)]
pub struct ConfigShowCommand {
    /// Filter to a specific section (e.g., 'wheel', 'assets').
    #[arg(short = 's', long)]
    pub section: Option<String>,
}

/// Arguments for 'config get' command.
#[derive(Args, Debug)]
pub struct ConfigGetCommand {
    /// Config key in dot notation (e.g., wheel.cooldown_ms).
    pub key: String,
}

/// Arguments for 'config set' command.
#[derive(Args, Debug)]
pub struct ConfigSetCommand {
    /// Config key in dot notation (e.g., wheel.cooldown_ms).
    pub key: String,

    /// Value to set.
    pub value: String,
}

/// Arguments for 'config reset' command.
#[derive(Args, Debug)]
pub struct ConfigResetCommand {
    /// Key or section to reset. If omitted, resets all config.
    pub key: Option<String>,
}

/// Arguments for 'config explain' command.
#[derive(Args, Debug)]
pub struct ConfigExplainCommand {
    /// Key or section to explain. If omitted, lists all keys.
    pub key: Option<String>,
}

/// Arguments for the 'completions' command.
#[derive(Args, Debug)]
pub struct CompletionsCommand {
    /// Shell to generate completions for.
    #[arg(value_parser = ["bash", "zsh", "fish"])]
    pub shell: String,
}

impl Cli {
    /// Run the selected command.
    pub fn run(self) -> CliResult {
        let config = self.config.as_deref();
        let Some(command) = self.command else {
            print_quick_start();
            return Ok(ExitCode::SUCCESS);
        };

        match command {
            Commands::Spin(c) => c.execute(config),
            Commands::Play(c) => c.execute(config),
            Commands::Preload(c) => c.execute(config),
            Commands::Catalog(c) => c.execute(config),
            Commands::Init(c) => c.execute(config),
            Commands::Config(subcmd) => subcmd.execute(config),
            Commands::Completions(c) => c.execute(),
        }
    }
}

fn print_quick_start() {
    println!("cat-roulette - spin the wheel, get a cat.");
    println!();
    println!("Run 'cat-roulette --help' for available commands.");
    println!();
    println!("Quick start:");
    println!("  cat-roulette init            # Write .roulette/config.json");
    println!("  cat-roulette spin            # Spin once");
    println!("  cat-roulette play            # Interactive wheel");
}

/// Build the single-threaded runtime commands run on.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Print an error and map it to the failure exit code.
pub fn handle_result(result: CliResult) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Command implementations
// ============================================================================

impl SpinCommand {
    /// Execute the spin command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        let options = commands::spin::SpinOptions {
            count: self.count,
            seed: self.seed,
            duration_ms: self.duration_ms,
            preload: !self.no_preload,
            feedback: self.feedback.clone(),
        };
        let result = runtime()?.block_on(commands::spin::spin(config, options))?;
        Ok(commands::spin::exit_code(&result))
    }
}

impl PlayCommand {
    /// Execute the play command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        runtime()?.block_on(commands::play::play(config, self.seed))?;
        Ok(ExitCode::SUCCESS)
    }
}

impl PreloadCommand {
    /// Execute the preload command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        let report = runtime()?.block_on(commands::preload::preload(config, self.json))?;
        Ok(if report.is_complete() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

impl CatalogCommand {
    /// Execute the catalog command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        commands::catalog::catalog(config, self.json)?;
        Ok(ExitCode::SUCCESS)
    }
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        commands::init::init(config, self.force)?;
        Ok(ExitCode::SUCCESS)
    }
}

impl ConfigCommands {
    /// Execute a config subcommand.
    pub fn execute(&self, config: Option<&Path>) -> CliResult {
        use commands::config;

        match self {
            ConfigCommands::Show(c) => config::config_show(config, c.section.as_deref())?,
            ConfigCommands::Get(c) => config::config_get(config, &c.key)?,
            ConfigCommands::Set(c) => config::config_set(config, &c.key, &c.value)?,
            ConfigCommands::Reset(c) => config::config_reset(config, c.key.as_deref())?,
            ConfigCommands::Explain(c) => config::config_explain(config, c.key.as_deref())?,
            ConfigCommands::Keys => config::config_keys()?,
        }
        Ok(ExitCode::SUCCESS)
    }
}

impl CompletionsCommand {
    /// Execute the completions command - generates shell completions.
    pub fn execute(&self) -> CliResult {
        commands::completions::completions(&self.shell)?;
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_spin_options() {
        let cli = Cli::parse_from([
            "cat-roulette",
            "spin",
            "-n",
            "3",
            "--seed",
            "42",
            "--duration-ms",
            "10",
        ]);
        match cli.command {
            Some(Commands::Spin(c)) => {
                assert_eq!(c.count, 3);
                assert_eq!(c.seed, Some(42));
                assert_eq!(c.duration_ms, Some(10));
                assert!(!c.no_preload);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "cat-roulette",
            "config",
            "get",
            "wheel.cooldown_ms",
            "--config",
            "custom.json",
            "-v",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some(Path::new("custom.json")));
    }

    #[test]
    fn test_rejects_unknown_feedback_mode() {
        assert!(Cli::try_parse_from(["cat-roulette", "spin", "--feedback", "loud"]).is_err());
    }

    #[test]
    fn test_handle_result_maps_errors_to_failure() {
        let code = handle_result(Err(anyhow::anyhow!("boom")));
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::FAILURE));
        let code = handle_result(Ok(ExitCode::SUCCESS));
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
    }
}
