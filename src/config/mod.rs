//! Configuration models for .roulette/config.json.
//!
//! Every section has serde defaults, so a missing file or a partial file
//! both produce a complete configuration.

pub mod field;
pub mod metadata;
mod validation;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use field::{ConfigField, FieldError};

use crate::catalog::{default_cat_items, CatalogError, Item, ItemCatalog};
use crate::feedback::DisplayMode;
use crate::render::RetryPolicy;
use crate::wheel::WheelSettings;

/// Default config directory path.
pub const ROULETTE_DIR: &str = ".roulette";
/// Default config file path.
pub const CONFIG_FILE: &str = ".roulette/config.json";

fn default_true() -> bool {
    true
}

/// Spin timing and rotation bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Minimum full turns per spin.
    #[serde(default = "default_min_rotations")]
    pub min_rotations: f64,
    /// Maximum full turns per spin (exclusive).
    #[serde(default = "default_max_rotations")]
    pub max_rotations: f64,
    /// Spin animation length in milliseconds.
    #[serde(default = "default_spin_duration_ms")]
    pub spin_duration_ms: u64,
    /// Minimum gap between spins in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_min_rotations() -> f64 {
    3.0
}

fn default_max_rotations() -> f64 {
    6.0
}

fn default_spin_duration_ms() -> u64 {
    3000
}

fn default_cooldown_ms() -> u64 {
    500
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            min_rotations: default_min_rotations(),
            max_rotations: default_max_rotations(),
            spin_duration_ms: default_spin_duration_ms(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

impl WheelConfig {
    /// Engine settings derived from this section.
    pub fn settings(&self) -> WheelSettings {
        WheelSettings {
            min_rotations: self.min_rotations,
            max_rotations: self.max_rotations,
            spin_duration: Duration::from_millis(self.spin_duration_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}

/// Where item images come from and how hard to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Local asset directory.
    #[serde(default = "default_assets_dir")]
    pub dir: String,
    /// Static file server to fetch from when the local read fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Bound on a single on-demand load, in milliseconds.
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,
    /// Bound on each load during bulk preload, in milliseconds.
    #[serde(default = "default_preload_timeout_ms")]
    pub preload_timeout_ms: u64,
    /// Retries after the first failed load.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base retry delay in milliseconds, multiplied by the retry number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Preload every asset at startup.
    #[serde(default = "default_true")]
    pub preload: bool,
    /// Watch the asset directory and retry failed loads on changes.
    #[serde(default)]
    pub watch: bool,
}

fn default_assets_dir() -> String {
    "images".to_string()
}

fn default_load_timeout_ms() -> u64 {
    8000
}

fn default_preload_timeout_ms() -> u64 {
    15000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
            base_url: None,
            load_timeout_ms: default_load_timeout_ms(),
            preload_timeout_ms: default_preload_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            preload: default_true(),
            watch: false,
        }
    }
}

impl AssetsConfig {
    /// Bound on a single on-demand load.
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Bound on each load during preload.
    pub fn preload_timeout(&self) -> Duration {
        Duration::from_millis(self.preload_timeout_ms)
    }

    /// Retry schedule for the result renderer.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

/// Terminal feedback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Display mode.
    #[serde(default)]
    pub mode: DisplayMode,
    /// Show the cat mascot in full mode.
    #[serde(default = "default_true")]
    pub show_art: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::default(),
            show_art: default_true(),
        }
    }
}

/// The wheel's items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Items in segment order.
    #[serde(default = "default_cat_items")]
    pub items: Vec<Item>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            items: default_cat_items(),
        }
    }
}

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouletteConfig {
    /// Spin settings.
    #[serde(default)]
    pub wheel: WheelConfig,
    /// Asset loading settings.
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Feedback display settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Catalog items.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Error type for config operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the config file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Error parsing the config file JSON.
    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
    /// The catalog section does not describe a valid catalog.
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl RouletteConfig {
    /// Load configuration from a file, or return defaults if it doesn't exist.
    ///
    /// `path` defaults to `.roulette/config.json`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        let config: RouletteConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration, creating parent directories as needed.
    pub fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// Get the path for the config directory.
    pub fn roulette_dir() -> PathBuf {
        PathBuf::from(ROULETTE_DIR)
    }

    /// Get the path for the config file.
    pub fn config_file() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wheel = &self.wheel;
        if !(wheel.min_rotations.is_finite() && wheel.max_rotations.is_finite()) {
            return Err(ConfigError::Invalid(
                "wheel rotations must be finite numbers".into(),
            ));
        }
        if wheel.min_rotations < 0.0 || wheel.max_rotations < wheel.min_rotations {
            return Err(ConfigError::Invalid(format!(
                "wheel.min_rotations ({}) must be >= 0 and <= wheel.max_rotations ({})",
                wheel.min_rotations, wheel.max_rotations
            )));
        }
        if self.assets.load_timeout_ms == 0 || self.assets.preload_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "asset timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Validate and build the item catalog.
    pub fn build_catalog(&self) -> Result<ItemCatalog, ConfigError> {
        Ok(ItemCatalog::new(self.catalog.items.clone())?)
    }

    /// Get a config value by dot-notation path (e.g., "wheel.cooldown_ms").
    pub fn get_by_path(&self, path: &str) -> Result<String, FieldError> {
        let (section, key) = field::split_path(path)?;
        let value = match section {
            "wheel" => self.wheel.get_field(key),
            "assets" => self.assets.get_field(key),
            "feedback" => self.feedback.get_field(key),
            _ => None,
        };
        value.ok_or_else(|| FieldError::UnknownKey(path.into()))
    }

    /// Set a config value by dot-notation path.
    pub fn set_by_path(&mut self, path: &str, value: &str) -> Result<(), FieldError> {
        let (section, key) = field::split_path(path)?;
        match section {
            "wheel" => self.wheel.set_field(key, value),
            "assets" => self.assets.set_field(key, value),
            "feedback" => self.feedback.set_field(key, value),
            _ => Err(FieldError::UnknownKey(path.into())),
        }
    }

    /// List all section names.
    pub fn section_names() -> &'static [&'static str] {
        &["wheel", "assets", "feedback", "catalog"]
    }

    /// Get all field names for a section.
    pub fn fields_for_section(section: &str) -> Option<&'static [&'static str]> {
        match section {
            "wheel" => Some(WheelConfig::field_names()),
            "assets" => Some(AssetsConfig::field_names()),
            "feedback" => Some(FeedbackConfig::field_names()),
            _ => None,
        }
    }

    /// List all scalar config keys as dot-notation paths.
    pub fn all_keys() -> Vec<String> {
        Self::section_names()
            .iter()
            .filter_map(|section| {
                Self::fields_for_section(section)
                    .map(|fields| fields.iter().map(move |f| format!("{section}.{f}")))
            })
            .flatten()
            .collect()
    }

    /// Reset a section to its default values.
    pub fn reset_section(&mut self, section: &str) -> Result<(), FieldError> {
        match section {
            "wheel" => self.wheel = WheelConfig::default(),
            "assets" => self.assets = AssetsConfig::default(),
            "feedback" => self.feedback = FeedbackConfig::default(),
            "catalog" => self.catalog = CatalogConfig::default(),
            _ => return Err(FieldError::UnknownKey(section.into())),
        }
        Ok(())
    }

    /// Reset a specific field to its default value.
    pub fn reset_field(&mut self, path: &str) -> Result<(), FieldError> {
        let default_value = Self::default().get_by_path(path)?;
        self.set_by_path(path, &default_value)
    }
}
