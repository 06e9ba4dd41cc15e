//! Descriptions, types and defaults for every config key.
//!
//! Used by `cat-roulette config explain`.

/// Metadata for a single config key.
#[derive(Debug, Clone)]
pub struct KeyMetadata {
    /// The full dot-notation key (e.g., "wheel.cooldown_ms").
    pub key: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Type description.
    pub value_type: &'static str,
    /// Default value as string.
    pub default: &'static str,
    /// Example values.
    pub examples: &'static [&'static str],
}

/// All config key metadata.
pub static METADATA: &[KeyMetadata] = &[
    KeyMetadata {
        key: "wheel.min_rotations",
        description: "Minimum number of full turns in a spin. The actual count is drawn \
                      uniformly between this and wheel.max_rotations.",
        value_type: "non-negative number",
        default: "3",
        examples: &["2", "3", "4.5"],
    },
    KeyMetadata {
        key: "wheel.max_rotations",
        description: "Upper bound (exclusive) on full turns in a spin.",
        value_type: "non-negative number",
        default: "6",
        examples: &["5", "6", "10"],
    },
    KeyMetadata {
        key: "wheel.spin_duration_ms",
        description: "How long the wheel animates before the result is revealed.",
        value_type: "positive integer (milliseconds)",
        default: "3000",
        examples: &["1500", "3000", "5000"],
    },
    KeyMetadata {
        key: "wheel.cooldown_ms",
        description: "Minimum time between spins, counted from the later of the last \
                      trigger and the last completed spin.",
        value_type: "non-negative integer (milliseconds)",
        default: "500",
        examples: &["0", "500", "2000"],
    },
    KeyMetadata {
        key: "assets.dir",
        description: "Directory holding the item images, relative to the working directory.",
        value_type: "directory path",
        default: "images",
        examples: &["images", "assets/cats"],
    },
    KeyMetadata {
        key: "assets.base_url",
        description: "Static file server to fetch images from when the local read fails.",
        value_type: "URL (optional)",
        default: "(not set)",
        examples: &["http://localhost:3000/images"],
    },
    KeyMetadata {
        key: "assets.load_timeout_ms",
        description: "Hard bound on a single image load. A load still pending after this \
                      is treated as failed.",
        value_type: "positive integer (milliseconds)",
        default: "8000",
        examples: &["2000", "8000"],
    },
    KeyMetadata {
        key: "assets.preload_timeout_ms",
        description: "Hard bound on each image load during startup preload.",
        value_type: "positive integer (milliseconds)",
        default: "15000",
        examples: &["5000", "15000"],
    },
    KeyMetadata {
        key: "assets.max_retries",
        description: "Retries after a failed load before a placeholder is shown.",
        value_type: "non-negative integer",
        default: "2",
        examples: &["0", "2", "5"],
    },
    KeyMetadata {
        key: "assets.retry_backoff_ms",
        description: "Base retry delay. Retry n waits n times this value.",
        value_type: "non-negative integer (milliseconds)",
        default: "1000",
        examples: &["250", "1000"],
    },
    KeyMetadata {
        key: "assets.preload",
        description: "Load every image before the first spin.",
        value_type: "boolean",
        default: "true",
        examples: &["true", "false"],
    },
    KeyMetadata {
        key: "assets.watch",
        description: "Watch the image directory and retry failed loads when files change.",
        value_type: "boolean",
        default: "false",
        examples: &["true", "false"],
    },
    KeyMetadata {
        key: "feedback.mode",
        description: "How status messages are printed: full panels, single lines, or nothing.",
        value_type: "full | minimal | off",
        default: "minimal",
        examples: &["full", "minimal", "off"],
    },
    KeyMetadata {
        key: "feedback.show_art",
        description: "Show the cat mascot next to results in full mode.",
        value_type: "boolean",
        default: "true",
        examples: &["true", "false"],
    },
];

/// Get metadata for a specific key.
pub fn get_metadata(key: &str) -> Option<&'static KeyMetadata> {
    METADATA.iter().find(|m| m.key == key)
}

/// Search for keys whose name or description contains `query`.
pub fn search_keys(query: &str) -> Vec<&'static KeyMetadata> {
    let query_lower = query.to_lowercase();
    METADATA
        .iter()
        .filter(|m| {
            m.key.to_lowercase().contains(&query_lower)
                || m.description.to_lowercase().contains(&query_lower)
        })
        .collect()
}

/// Get all keys for a specific section.
pub fn keys_for_section(section: &str) -> Vec<&'static KeyMetadata> {
    let prefix = format!("{section}.");
    METADATA
        .iter()
        .filter(|m| m.key.starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouletteConfig;

    #[test]
    fn test_get_metadata() {
        let meta = get_metadata("wheel.cooldown_ms").unwrap();
        assert_eq!(meta.default, "500");
        assert!(get_metadata("nonexistent.key").is_none());
    }

    #[test]
    fn test_search_keys_matches_descriptions() {
        let results = search_keys("placeholder");
        assert!(results.iter().any(|m| m.key == "assets.max_retries"));
    }

    #[test]
    fn test_keys_for_section() {
        assert_eq!(keys_for_section("wheel").len(), 4);
        assert_eq!(keys_for_section("feedback").len(), 2);
    }

    #[test]
    fn test_every_config_key_is_documented() {
        for key in RouletteConfig::all_keys() {
            assert!(get_metadata(&key).is_some(), "missing metadata for {key}");
        }
        assert_eq!(METADATA.len(), RouletteConfig::all_keys().len());
    }

    #[test]
    fn test_documented_defaults_match_config() {
        let config = RouletteConfig::default();
        for meta in METADATA {
            assert_eq!(
                config.get_by_path(meta.key).unwrap(),
                meta.default,
                "default mismatch for {}",
                meta.key
            );
        }
    }
}
