//! Spin command implementation.
//!
//! This module implements `cat-roulette spin`: a fixed number of spins drawn
//! on the line-oriented terminal surface.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use crate::cli::output::run_summary;
use crate::config::{ConfigError, RouletteConfig};
use crate::feedback::{DisplayMode, FeedbackChannel, TerminalFeedback};
use crate::runner::{BootstrapError, Roulette, RunOptions, RunResult, SpinController, StopReason};
use crate::surface::TerminalSurface;

/// Error type for spin command operations.
#[derive(Debug, thiserror::Error)]
pub enum SpinCommandError {
    /// Failed to load the configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The game could not start.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// A command-line override is out of range.
    #[error("--duration-ms must be greater than zero")]
    ZeroDuration,
}

/// Options for the spin command.
#[derive(Debug, Clone)]
pub struct SpinOptions {
    /// Spins to run.
    pub count: u32,
    /// RNG seed.
    pub seed: Option<u64>,
    /// Spin duration override in milliseconds.
    pub duration_ms: Option<u64>,
    /// Preload images first.
    pub preload: bool,
    /// Feedback mode override.
    pub feedback: Option<String>,
}

/// Apply command-line overrides to the loaded config.
fn apply_overrides(
    config: &mut RouletteConfig,
    options: &SpinOptions,
) -> Result<(), SpinCommandError> {
    if let Some(ms) = options.duration_ms {
        if ms == 0 {
            return Err(SpinCommandError::ZeroDuration);
        }
        config.wheel.spin_duration_ms = ms;
    }
    if let Some(mode) = options.feedback.as_deref().and_then(DisplayMode::parse) {
        config.feedback.mode = mode;
    }
    Ok(())
}

/// Execute the spin command.
pub async fn spin(
    config_path: Option<&Path>,
    options: SpinOptions,
) -> Result<RunResult, SpinCommandError> {
    let mut config = RouletteConfig::load(config_path)?;
    apply_overrides(&mut config, &options)?;

    let mode = config.feedback.mode;
    let feedback = FeedbackChannel::new(Arc::new(TerminalFeedback::new(
        mode,
        config.feedback.show_art,
    )));
    let labels = config
        .catalog
        .items
        .iter()
        .map(|item| item.label.clone())
        .collect();
    let surface = Arc::new(TerminalSurface::new(labels));
    let run_options = RunOptions::new(options.count)
        .with_preload(options.preload && config.assets.preload)
        .with_watch(config.assets.watch);

    let roulette = Roulette::bootstrap(config, Path::new("."), surface, feedback, options.seed)?;
    let controller = SpinController::new(roulette);
    if let Err(e) = controller.install_interrupt_handler() {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }

    let result = controller.run(&run_options).await;
    if mode != DisplayMode::Off {
        println!();
        for line in run_summary(&result) {
            println!("{line}");
        }
    }
    Ok(result)
}

/// Exit code for a finished run.
pub fn exit_code(result: &RunResult) -> ExitCode {
    match result.stop_reason {
        StopReason::Complete => ExitCode::SUCCESS,
        StopReason::UserInterrupt | StopReason::EmptyCatalog => ExitCode::FAILURE,
    }
}
