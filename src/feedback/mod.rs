//! Transient status and progress notifications.
//!
//! The core emits [`Notification`]s through a [`FeedbackChannel`]; where they
//! end up (terminal lines, the TUI log, a test recorder) is decided by the
//! [`FeedbackSink`] the channel was built with.

mod art;
mod display;
mod spinner;

use std::fmt;
use std::sync::Arc;

pub use art::{get_mascot, get_sparkle_char, get_spinner_frame, MASCOT_STATES, SPINNERS};
pub use display::{DisplayMode, TerminalFeedback};
pub use spinner::Spinner;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Neutral status information.
    Info,
    /// Something is in progress (spinning, loading).
    Progress,
    /// A result was delivered.
    Success,
    /// Degraded outcome, e.g. a placeholder was shown.
    Warning,
    /// A render call failed.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Info => "info",
            Level::Progress => "progress",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(name)
    }
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

impl Notification {
    /// Create a notification.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Destination for notifications.
pub trait FeedbackSink: Send + Sync {
    /// Deliver one notification. Sinks must not block for long.
    fn notify(&self, notification: &Notification);
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn notify(&self, _notification: &Notification) {}
}

/// Cheaply cloneable handle the core uses to emit notifications.
///
/// Every notification is also recorded as a `tracing` event so the log
/// shows the same story the user saw.
#[derive(Clone)]
pub struct FeedbackChannel {
    sink: Arc<dyn FeedbackSink>,
}

impl FeedbackChannel {
    /// Create a channel delivering to `sink`.
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    /// A channel that only logs.
    pub fn silent() -> Self {
        Self::new(Arc::new(NullSink))
    }

    /// Emit a notification at the given level.
    pub fn emit(&self, level: Level, message: impl Into<String>) {
        let notification = Notification::new(level, message);
        match level {
            Level::Warning => tracing::warn!(target: "feedback", "{}", notification.message),
            Level::Error => tracing::error!(target: "feedback", "{}", notification.message),
            _ => tracing::debug!(target: "feedback", level = %level, "{}", notification.message),
        }
        self.sink.notify(&notification);
    }

    /// Emit an info notification.
    pub fn info(&self, message: impl Into<String>) {
        self.emit(Level::Info, message);
    }

    /// Emit a progress notification.
    pub fn progress(&self, message: impl Into<String>) {
        self.emit(Level::Progress, message);
    }

    /// Emit a success notification.
    pub fn success(&self, message: impl Into<String>) {
        self.emit(Level::Success, message);
    }

    /// Emit a warning notification.
    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Level::Warning, message);
    }

    /// Emit an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message);
    }
}

impl fmt::Debug for FeedbackChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackChannel").finish_non_exhaustive()
    }
}
