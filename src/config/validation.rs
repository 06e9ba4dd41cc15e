//! ConfigField implementations for each config section.

use super::field::{
    format_optional, parse_bool, parse_optional, parse_value, ConfigField, FieldError,
};
use super::{AssetsConfig, FeedbackConfig, WheelConfig};
use crate::feedback::DisplayMode;

const NON_NEGATIVE_INT: &str = "non-negative integer";
const POSITIVE_INT: &str = "positive integer";

fn parse_positive(key: &str, value: &str) -> Result<u64, FieldError> {
    match parse_value::<u64>(key, value, POSITIVE_INT)? {
        0 => Err(FieldError::InvalidValue {
            key: key.into(),
            expected: POSITIVE_INT.into(),
        }),
        n => Ok(n),
    }
}

fn parse_rotations(key: &str, value: &str) -> Result<f64, FieldError> {
    let n: f64 = parse_value(key, value, "non-negative number")?;
    if n.is_finite() && n >= 0.0 {
        Ok(n)
    } else {
        Err(FieldError::InvalidValue {
            key: key.into(),
            expected: "non-negative number".into(),
        })
    }
}

impl ConfigField for WheelConfig {
    fn get_field(&self, key: &str) -> Option<String> {
        match key {
            "min_rotations" => Some(self.min_rotations.to_string()),
            "max_rotations" => Some(self.max_rotations.to_string()),
            "spin_duration_ms" => Some(self.spin_duration_ms.to_string()),
            "cooldown_ms" => Some(self.cooldown_ms.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "min_rotations" => self.min_rotations = parse_rotations(key, value)?,
            "max_rotations" => self.max_rotations = parse_rotations(key, value)?,
            "spin_duration_ms" => self.spin_duration_ms = parse_positive(key, value)?,
            "cooldown_ms" => self.cooldown_ms = parse_value(key, value, NON_NEGATIVE_INT)?,
            _ => return Err(FieldError::UnknownKey(key.into())),
        }
        Ok(())
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "min_rotations",
            "max_rotations",
            "spin_duration_ms",
            "cooldown_ms",
        ]
    }

    fn section_name() -> &'static str {
        "wheel"
    }
}

impl ConfigField for AssetsConfig {
    fn get_field(&self, key: &str) -> Option<String> {
        match key {
            "dir" => Some(self.dir.clone()),
            "base_url" => Some(format_optional(&self.base_url)),
            "load_timeout_ms" => Some(self.load_timeout_ms.to_string()),
            "preload_timeout_ms" => Some(self.preload_timeout_ms.to_string()),
            "max_retries" => Some(self.max_retries.to_string()),
            "retry_backoff_ms" => Some(self.retry_backoff_ms.to_string()),
            "preload" => Some(self.preload.to_string()),
            "watch" => Some(self.watch.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "dir" => {
                if value.trim().is_empty() {
                    return Err(FieldError::InvalidValue {
                        key: key.into(),
                        expected: "directory path".into(),
                    });
                }
                self.dir = value.trim().to_string();
            }
            "base_url" => {
                let url = parse_optional(value);
                if let Some(u) = &url {
                    if !(u.starts_with("http://") || u.starts_with("https://")) {
                        return Err(FieldError::InvalidValue {
                            key: key.into(),
                            expected: "http:// or https:// URL".into(),
                        });
                    }
                }
                self.base_url = url;
            }
            "load_timeout_ms" => self.load_timeout_ms = parse_positive(key, value)?,
            "preload_timeout_ms" => self.preload_timeout_ms = parse_positive(key, value)?,
            "max_retries" => self.max_retries = parse_value(key, value, NON_NEGATIVE_INT)?,
            "retry_backoff_ms" => {
                self.retry_backoff_ms = parse_value(key, value, NON_NEGATIVE_INT)?
            }
            "preload" => self.preload = parse_bool(value).map_err(|_| bool_error(key))?,
            "watch" => self.watch = parse_bool(value).map_err(|_| bool_error(key))?,
            _ => return Err(FieldError::UnknownKey(key.into())),
        }
        Ok(())
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "dir",
            "base_url",
            "load_timeout_ms",
            "preload_timeout_ms",
            "max_retries",
            "retry_backoff_ms",
            "preload",
            "watch",
        ]
    }

    fn section_name() -> &'static str {
        "assets"
    }
}

impl ConfigField for FeedbackConfig {
    fn get_field(&self, key: &str) -> Option<String> {
        match key {
            "mode" => Some(self.mode.as_str().to_string()),
            "show_art" => Some(self.show_art.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "mode" => {
                self.mode = DisplayMode::parse(value).ok_or_else(|| FieldError::InvalidValue {
                    key: key.into(),
                    expected: "full, minimal, or off".into(),
                })?
            }
            "show_art" => self.show_art = parse_bool(value).map_err(|_| bool_error(key))?,
            _ => return Err(FieldError::UnknownKey(key.into())),
        }
        Ok(())
    }

    fn field_names() -> &'static [&'static str] {
        &["mode", "show_art"]
    }

    fn section_name() -> &'static str {
        "feedback"
    }
}

fn bool_error(key: &str) -> FieldError {
    FieldError::InvalidValue {
        key: key.into(),
        expected: "true or false".into(),
    }
}
