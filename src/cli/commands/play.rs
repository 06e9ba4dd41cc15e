//! Play command implementation.
//!
//! This module implements `cat-roulette play`, the interactive ratatui wheel.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigError, RouletteConfig};
use crate::feedback::FeedbackChannel;
use crate::runner::{BootstrapError, Roulette};
use crate::tui::{TuiApp, TuiFeedback, TuiSurface};
use crate::watcher::AssetWatcher;

/// Error type for play command operations.
#[derive(Debug, thiserror::Error)]
pub enum PlayCommandError {
    /// Failed to load the configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The game could not start.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The terminal could not be set up or drawn.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    /// The event loop thread panicked.
    #[error("TUI event loop failed: {0}")]
    EventLoop(#[from] tokio::task::JoinError),
}

/// Execute the play command.
///
/// The event loop runs on a blocking thread while the current thread keeps
/// driving spin and load tasks.
pub async fn play(config_path: Option<&Path>, seed: Option<u64>) -> Result<(), PlayCommandError> {
    let config = RouletteConfig::load(config_path)?;
    let labels = config
        .catalog
        .items
        .iter()
        .map(|item| item.label.clone())
        .collect();

    let mut app = TuiApp::new(labels)?;
    let surface = Arc::new(TuiSurface::new(app.sender()));
    let feedback = FeedbackChannel::new(Arc::new(TuiFeedback::new(app.sender())));
    let preload = config.assets.preload;
    let watch = config.assets.watch;

    let roulette = Arc::new(Roulette::bootstrap(
        config,
        Path::new("."),
        surface,
        feedback,
        seed,
    )?);

    if preload {
        let background = roulette.clone();
        tokio::spawn(async move {
            background.preload().await;
        });
    }

    let mut watcher = None;
    if watch {
        let mut w = AssetWatcher::new(
            roulette.asset_root(),
            roulette.cache().clone(),
            roulette.feedback().clone(),
        );
        match w.start() {
            Ok(()) => watcher = Some(w),
            Err(e) => roulette
                .feedback()
                .warning(format!("Not watching images: {e}")),
        }
    }

    let engine = roulette.engine().clone();
    let cache = roulette.cache().clone();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = app.run(&engine, &cache);
        drop(app);
        outcome
    })
    .await?;

    drop(watcher);
    result?;
    Ok(())
}
