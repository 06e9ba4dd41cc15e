//! Config command implementations.
//!
//! This module implements the `cat-roulette config` subcommands for managing
//! configuration without editing JSON directly.

use std::path::Path;

use crate::config::{
    metadata::{self, KeyMetadata},
    FieldError, RouletteConfig,
};

/// Result type for config command operations.
pub type ConfigCommandResult = Result<(), ConfigCommandError>;

/// Error type for config command operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigCommandError {
    /// A key or value was rejected.
    #[error("{0}")]
    FieldError(#[from] FieldError),

    /// Loading or saving failed.
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),

    /// No such section.
    #[error("Unknown section: {0}")]
    UnknownSection(String),
}

/// Show all config values in a human-readable format.
pub fn config_show(path: Option<&Path>, section_filter: Option<&str>) -> ConfigCommandResult {
    let config = RouletteConfig::load(path)?;

    println!("\x1b[1m=== cat-roulette config ===\x1b[0m");
    println!();

    let sections: Vec<&str> = match section_filter {
        Some(filter) if RouletteConfig::section_names().contains(&filter) => vec![filter],
        Some(filter) => return Err(ConfigCommandError::UnknownSection(filter.into())),
        None => RouletteConfig::section_names().to_vec(),
    };

    for section in sections {
        println!("\x1b[36m{section}\x1b[0m");
        if section == "catalog" {
            for item in &config.catalog.items {
                println!("  {:>2}. {} ({})", item.id, item.label, item.asset_ref);
            }
            if config.catalog.items.is_empty() {
                println!("  \x1b[2m(no items)\x1b[0m");
            }
        } else if let Some(fields) = RouletteConfig::fields_for_section(section) {
            for field in fields {
                let key = format!("{section}.{field}");
                let value = config.get_by_path(&key).unwrap_or_else(|_| "?".into());
                println!("  {:<24} {}", field, value);
            }
        }
        println!();
    }

    Ok(())
}

/// Get a specific config value.
pub fn config_get(path: Option<&Path>, key: &str) -> ConfigCommandResult {
    let config = RouletteConfig::load(path)?;
    let value = config.get_by_path(key)?;
    println!("{value}");
    Ok(())
}

/// Set a config value.
pub fn config_set(path: Option<&Path>, key: &str, value: &str) -> ConfigCommandResult {
    let mut config = RouletteConfig::load(path)?;
    let old_value = config.get_by_path(key).ok();

    config.set_by_path(key, value)?;
    config.validate()?;
    config.save(path)?;

    let new_value = config.get_by_path(key)?;
    match old_value {
        Some(old) if old != new_value => {
            println!("\x1b[32m✓\x1b[0m {key}: {old} → {new_value}")
        }
        Some(_) => println!("\x1b[33m⚠\x1b[0m {key} unchanged: {new_value}"),
        None => println!("\x1b[32m✓\x1b[0m {key} = {new_value}"),
    }

    Ok(())
}

/// Reset config to defaults.
pub fn config_reset(path: Option<&Path>, key: Option<&str>) -> ConfigCommandResult {
    let mut config = RouletteConfig::load(path)?;

    match key {
        Some(k) if RouletteConfig::section_names().contains(&k) => {
            config.reset_section(k)?;
            println!("\x1b[32m✓\x1b[0m Reset section '{k}' to defaults");
        }
        Some(k) if k.contains('.') => {
            config.reset_field(k)?;
            let new_value = config.get_by_path(k)?;
            println!("\x1b[32m✓\x1b[0m Reset {k} to default: {new_value}");
        }
        Some(k) => return Err(ConfigCommandError::UnknownSection(k.into())),
        None => {
            config = RouletteConfig::default();
            println!("\x1b[32m✓\x1b[0m Reset all config to defaults");
        }
    }

    config.save(path)?;
    Ok(())
}

/// Show documentation for config keys.
pub fn config_explain(path: Option<&Path>, key: Option<&str>) -> ConfigCommandResult {
    match key {
        Some(k) => explain_key(path, k),
        None => {
            explain_all();
            Ok(())
        }
    }
}

fn explain_key(path: Option<&Path>, key: &str) -> ConfigCommandResult {
    if let Some(meta) = metadata::get_metadata(key) {
        let current = RouletteConfig::load(path)
            .ok()
            .and_then(|c| c.get_by_path(meta.key).ok());
        print_key_help(meta, current.as_deref());
        return Ok(());
    }

    if RouletteConfig::fields_for_section(key).is_some() {
        println!("\x1b[1m{key}\x1b[0m section");
        println!();
        for meta in metadata::keys_for_section(key) {
            let field = meta
                .key
                .strip_prefix(&format!("{key}."))
                .unwrap_or(meta.key);
            println!("  \x1b[36m{field}\x1b[0m");
            println!("    {}", first_sentence(meta.description));
        }
        return Ok(());
    }

    let matches = metadata::search_keys(key);
    if matches.is_empty() {
        eprintln!("\x1b[31mUnknown key:\x1b[0m {key}");
        eprintln!("Run \x1b[36mcat-roulette config explain\x1b[0m to see all available keys.");
        return Err(ConfigCommandError::FieldError(FieldError::UnknownKey(
            key.into(),
        )));
    }

    println!("\x1b[33mDid you mean:\x1b[0m");
    for meta in matches.iter().take(5) {
        println!("  {}", meta.key);
    }
    Ok(())
}

fn explain_all() {
    println!("\x1b[1m=== cat-roulette config keys ===\x1b[0m");
    println!();
    println!("Use \x1b[36mcat-roulette config explain <key>\x1b[0m for details.");
    println!();

    for &section in RouletteConfig::section_names() {
        println!("\x1b[1m{section}\x1b[0m");
        if section == "catalog" {
            println!("  (edit the items list in the config file)");
        }
        for meta in metadata::keys_for_section(section) {
            println!("  \x1b[36m{}\x1b[0m", meta.key);
            println!("    {}", first_sentence(meta.description));
        }
        println!();
    }
}

fn first_sentence(description: &str) -> &str {
    description.split(". ").next().unwrap_or(description)
}

fn print_key_help(meta: &KeyMetadata, current: Option<&str>) {
    println!("\x1b[1m{}\x1b[0m", meta.key);
    println!();
    println!("  {}", meta.description);
    println!();
    println!("  \x1b[2mType:\x1b[0m     {}", meta.value_type);
    println!("  \x1b[2mDefault:\x1b[0m  {}", meta.default);
    match current {
        Some(curr) if curr == meta.default => {
            println!("  \x1b[2mCurrent:\x1b[0m  {curr} \x1b[2m(default)\x1b[0m")
        }
        Some(curr) => println!("  \x1b[2mCurrent:\x1b[0m  \x1b[33m{curr}\x1b[0m"),
        None => {}
    }
    println!();
    println!("  \x1b[2mExamples:\x1b[0m");
    for example in meta.examples {
        println!("    cat-roulette config set {} {}", meta.key, example);
    }
}

/// List all valid config keys.
pub fn config_keys() -> ConfigCommandResult {
    for key in RouletteConfig::all_keys() {
        println!("{key}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_get_uses_given_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        config_set(Some(&path), "wheel.cooldown_ms", "250").unwrap();
        let config = RouletteConfig::load(Some(&path)).unwrap();
        assert_eq!(config.wheel.cooldown_ms, 250);
        config_get(Some(&path), "wheel.cooldown_ms").unwrap();
    }

    #[test]
    fn test_set_rejects_inconsistent_rotations() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");

        let err = config_set(Some(&path), "wheel.min_rotations", "9").unwrap_err();
        assert!(matches!(err, ConfigCommandError::ConfigError(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_set_invalid_value_is_field_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        assert!(matches!(
            config_set(Some(&path), "assets.max_retries", "lots"),
            Err(ConfigCommandError::FieldError(_))
        ));
    }

    #[test]
    fn test_reset_section_and_field() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        config_set(Some(&path), "assets.max_retries", "5").unwrap();
        config_set(Some(&path), "wheel.cooldown_ms", "0").unwrap();

        config_reset(Some(&path), Some("assets.max_retries")).unwrap();
        config_reset(Some(&path), Some("wheel")).unwrap();

        let config = RouletteConfig::load(Some(&path)).unwrap();
        assert_eq!(config.assets.max_retries, 2);
        assert_eq!(config.wheel.cooldown_ms, 500);
        assert!(matches!(
            config_reset(Some(&path), Some("bogus")),
            Err(ConfigCommandError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_show_rejects_unknown_section() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        assert!(config_show(Some(&path), Some("wheel")).is_ok());
        assert!(matches!(
            config_show(Some(&path), Some("limits")),
            Err(ConfigCommandError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_explain_unknown_key_fails() {
        assert!(config_explain(None, Some("zzz.nothing")).is_err());
        assert!(config_explain(None, Some("wheel.cooldown_ms")).is_ok());
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(first_sentence("One thing. Another."), "One thing");
        assert_eq!(first_sentence("Only one."), "Only one.");
    }
}
