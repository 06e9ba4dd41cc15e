//! Dynamic get/set access to config sections by field name.
//!
//! Powers `cat-roulette config get/set/reset`.

/// Error type for config field operations.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// The specified config key is not recognised.
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// The value provided is invalid for the specified key.
    #[error("Invalid value for {key}: expected {expected}")]
    InvalidValue {
        /// The config key that was being set.
        key: String,
        /// Description of the expected value format.
        expected: String,
    },

    /// The config path format is invalid.
    #[error("Invalid path format: {0}")]
    InvalidPath(String),
}

/// A config section whose fields can be read and written as strings.
pub trait ConfigField {
    /// Get a field value by name, or `None` if the key is not recognised.
    fn get_field(&self, key: &str) -> Option<String>;

    /// Set a field value by name from string input.
    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError>;

    /// All field names in this section.
    fn field_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// The section name used in dot paths.
    fn section_name() -> &'static str
    where
        Self: Sized;
}

/// Split a dot-notation path into section and field.
///
/// ```ignore
/// split_path("wheel.cooldown_ms") // Ok(("wheel", "cooldown_ms"))
/// split_path("wheel")             // Err(InvalidPath)
/// ```
pub fn split_path(path: &str) -> Result<(&str, &str), FieldError> {
    path.split_once('.')
        .ok_or_else(|| FieldError::InvalidPath(format!("{path} (expected section.field)")))
}

/// Format an optional string value for display.
pub fn format_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(not set)".to_string())
}

/// Parse an optional string; empty and "(not set)" clear the value.
pub fn parse_optional(value: &str) -> Option<String> {
    match value.trim() {
        "" | "(not set)" => None,
        v => Some(v.to_string()),
    }
}

/// Parse a boolean from various string representations.
pub fn parse_bool(value: &str) -> Result<bool, FieldError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(FieldError::InvalidValue {
            key: "bool".into(),
            expected: "true/false, yes/no, 1/0, on/off".into(),
        }),
    }
}

/// Parse a value with `FromStr`, mapping failure to `InvalidValue`.
pub fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &str,
) -> Result<T, FieldError> {
    value.trim().parse().map_err(|_| FieldError::InvalidValue {
        key: key.into(),
        expected: expected.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_valid() {
        let (section, field) = split_path("wheel.cooldown_ms").unwrap();
        assert_eq!(section, "wheel");
        assert_eq!(field, "cooldown_ms");
    }

    #[test]
    fn test_split_path_invalid() {
        assert!(matches!(
            split_path("invalid"),
            Err(FieldError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_optional_round_trip() {
        assert_eq!(format_optional(&None), "(not set)");
        assert_eq!(parse_optional("(not set)"), None);
        assert_eq!(parse_optional("  "), None);
        assert_eq!(
            parse_optional("http://localhost:3000"),
            Some("http://localhost:3000".to_string())
        );
    }

    #[test]
    fn test_parse_bool_variants() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool("on").unwrap());
        assert!(!parse_bool("no").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u64>("k", " 42 ", "integer").unwrap(), 42);
        let err = parse_value::<u64>("wheel.cooldown_ms", "-1", "integer").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for wheel.cooldown_ms: expected integer"
        );
    }
}
