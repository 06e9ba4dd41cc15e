//! Terminal feedback sink.
//!
//! Prints notifications as coloured status lines. In full mode, result
//! notifications are framed in a panel together with the cat mascot.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::art::get_mascot;
use super::{FeedbackSink, Level, Notification};

/// Inner width of the full-mode panel.
const PANEL_WIDTH: usize = 60;

/// Display mode for terminal feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One line per notification.
    #[default]
    Minimal,
    /// Panels with mascot art for results.
    Full,
    /// Print nothing.
    Off,
}

impl DisplayMode {
    /// Parse a display mode name, as used by the config and CLI.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minimal" => Some(DisplayMode::Minimal),
            "full" => Some(DisplayMode::Full),
            "off" | "none" => Some(DisplayMode::Off),
            _ => None,
        }
    }

    /// Name used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Minimal => "minimal",
            DisplayMode::Full => "full",
            DisplayMode::Off => "off",
        }
    }
}

/// Feedback sink writing to stdout.
#[derive(Debug, Clone)]
pub struct TerminalFeedback {
    mode: DisplayMode,
    show_art: bool,
}

impl TerminalFeedback {
    /// Create a sink with the given mode and mascot setting.
    pub fn new(mode: DisplayMode, show_art: bool) -> Self {
        Self { mode, show_art }
    }

    /// Render the lines for one notification without printing them.
    pub fn render(&self, notification: &Notification) -> Vec<String> {
        match self.mode {
            DisplayMode::Off => Vec::new(),
            DisplayMode::Minimal => vec![self.render_line(notification)],
            DisplayMode::Full => match notification.level {
                Level::Success | Level::Warning => self.render_panel(notification),
                _ => vec![self.render_line(notification)],
            },
        }
    }

    fn render_line(&self, notification: &Notification) -> String {
        let (icon, style) = level_style(notification.level);
        format!("{style}{icon}\x1b[0m {}", notification.message)
    }

    fn render_panel(&self, notification: &Notification) -> Vec<String> {
        let (_, style) = level_style(notification.level);
        let border = "─".repeat(PANEL_WIDTH + 2);
        let mut lines = vec![format!("{style}┌{border}┐\x1b[0m")];

        if self.show_art {
            let state = match notification.level {
                Level::Warning => "fallback",
                _ => "winner",
            };
            for art_line in get_mascot(state).lines() {
                lines.push(pad_line(art_line, style));
            }
        }

        lines.push(pad_line(
            &format!("\x1b[1m{}\x1b[0m", truncate(&notification.message, PANEL_WIDTH)),
            style,
        ));
        lines.push(format!("{style}└{border}┘\x1b[0m"));
        lines
    }
}

impl FeedbackSink for TerminalFeedback {
    fn notify(&self, notification: &Notification) {
        let lines = self.render(notification);
        if lines.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        for line in lines {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = stdout.flush();
    }
}

fn level_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::Info => ("•", "\x1b[2m"),
        Level::Progress => ("◐", "\x1b[36m"),
        Level::Success => ("✓", "\x1b[32;1m"),
        Level::Warning => ("!", "\x1b[33;1m"),
        Level::Error => ("✗", "\x1b[31;1m"),
    }
}

/// Pad a line to the panel width and close it with the border.
fn pad_line(line: &str, style: &str) -> String {
    let padding = PANEL_WIDTH.saturating_sub(visible_len(line));
    format!("{style}│\x1b[0m {}{} {style}│\x1b[0m", line, " ".repeat(padding))
}

/// Calculate visible length (excluding ANSI escape codes).
fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
        } else if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else {
            len += 1;
        }
    }
    len
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
