//! Init command implementation.
//!
//! This module implements the `cat-roulette init` command, which writes the
//! default configuration and creates the image directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, RouletteConfig, CONFIG_FILE};

/// Result type for init command operations.
pub type InitCommandResult = Result<PathBuf, InitCommandError>;

/// Error type for init command operations.
#[derive(Debug, thiserror::Error)]
pub enum InitCommandError {
    /// A config file already exists.
    #[error("Already initialised at {0}. Use --force to overwrite.")]
    AlreadyInitialised(String),
    /// Failed to save configuration file.
    #[error("Failed to save config: {0}")]
    SaveConfigError(#[from] ConfigError),
    /// Failed to create the image directory.
    #[error("Failed to create image directory: {0}")]
    CreateDirError(std::io::Error),
}

/// Execute the init command. Returns the path written.
pub fn init(config_path: Option<&Path>, force: bool) -> InitCommandResult {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if path.exists() && !force {
        return Err(InitCommandError::AlreadyInitialised(
            path.display().to_string(),
        ));
    }

    let config = RouletteConfig::default();
    config.save(Some(&path))?;

    let images = Path::new(&config.assets.dir);
    fs::create_dir_all(images).map_err(InitCommandError::CreateDirError)?;

    println!("\x1b[32m✓\x1b[0m Wrote {}", path.display());
    println!(
        "  Put {} images in \x1b[36m{}/\x1b[0m ({} ... {})",
        config.catalog.items.len(),
        images.display(),
        config
            .catalog
            .items
            .first()
            .map(|item| item.asset_ref.as_str())
            .unwrap_or("-"),
        config
            .catalog
            .items
            .last()
            .map(|item| item.asset_ref.as_str())
            .unwrap_or("-"),
    );
    println!("  Then run \x1b[36mcat-roulette spin\x1b[0m");
    Ok(path)
}
