//! ASCII art module with animated spinner definitions.
//!
//! Provides spinner frame sequences, cat mascot states for each phase of a
//! spin, and helper functions for terminal animations.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Sparkle characters shown around a revealed winner.
pub static SPARKLE_CHARS: &[char] = &['✦', '✧', '★', '☆', '✴', '✵'];

/// Spinner frame sequences for different animation styles.
pub static SPINNERS: LazyLock<HashMap<&'static str, Vec<&'static str>>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "dots",
        vec!["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    );
    m.insert("wheel", vec!["◐", "◓", "◑", "◒"]);
    m.insert("arrows", vec!["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"]);
    m.insert("pulse", vec!["◯", "◎", "●", "◎"]);
    m
});

/// Fallback frame when a spinner has no frames at all.
const EMPTY_FRAME: &str = "*";

/// Cat mascot definitions for the phases of a spin.
pub static MASCOT_STATES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "waiting",
        r#"   /\_/\
  ( o.o )
   > ^ <"#,
    );
    m.insert(
        "spinning",
        r#"   /\_/\
  ( @.@ )
   > ~ <"#,
    );
    m.insert(
        "winner",
        r#"   /\_/\
  ( ^.^ )
  \> ♥ </"#,
    );
    m.insert(
        "fallback",
        r#"   /\_/\
  ( -.- )
   > ? <"#,
    );
    m
});

/// Get a sparkle character by index (cycles through available chars).
pub fn get_sparkle_char(index: usize) -> char {
    SPARKLE_CHARS[index % SPARKLE_CHARS.len()]
}

/// Get a spinner frame by name and index.
///
/// The index wraps around the frame sequence, so you can increment
/// indefinitely and the frames will cycle. Falls back to the `dots`
/// spinner if the name is unknown.
pub fn get_spinner_frame(name: &str, index: usize) -> &'static str {
    SPINNERS
        .get(name)
        .or_else(|| SPINNERS.get("dots"))
        .filter(|frames| !frames.is_empty())
        .map(|frames| frames[index % frames.len()])
        .unwrap_or(EMPTY_FRAME)
}

/// Get mascot ASCII art for a given state.
///
/// Falls back to the `waiting` cat if the state is unknown.
pub fn get_mascot(state: &str) -> &'static str {
    MASCOT_STATES
        .get(state)
        .or_else(|| MASCOT_STATES.get("waiting"))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_sparkle_char_wraps() {
        let len = SPARKLE_CHARS.len();
        assert_eq!(get_sparkle_char(0), SPARKLE_CHARS[0]);
        assert_eq!(get_sparkle_char(len), SPARKLE_CHARS[0]);
        assert_eq!(get_sparkle_char(len + 1), SPARKLE_CHARS[1]);
    }

    #[test]
    fn test_spinner_frames_wrap() {
        let frames = &SPINNERS["wheel"];
        assert_eq!(get_spinner_frame("wheel", 0), frames[0]);
        assert_eq!(get_spinner_frame("wheel", frames.len()), frames[0]);
    }

    #[test]
    fn test_unknown_spinner_falls_back_to_dots() {
        assert_eq!(get_spinner_frame("nope", 0), SPINNERS["dots"][0]);
    }

    #[test]
    fn test_mascot_states_exist() {
        for state in ["waiting", "spinning", "winner", "fallback"] {
            assert!(!get_mascot(state).is_empty(), "missing mascot {state}");
        }
    }

    #[test]
    fn test_unknown_mascot_falls_back_to_waiting() {
        assert_eq!(get_mascot("asleep"), get_mascot("waiting"));
    }
}
