//! Game runner.
//!
//! Wires the components together at startup and drives a fixed number of
//! spins for the non-interactive `spin` command.

mod bootstrap;
mod controller;

use std::fmt;

use crate::catalog::ItemId;

pub use bootstrap::{build_loader, BootstrapError, Roulette};
pub use controller::SpinController;

/// Options for a batch of spins.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Spins to complete before stopping.
    pub count: u32,
    /// Preload every asset before the first spin.
    pub preload: bool,
    /// Watch the asset directory while running.
    pub watch: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            count: 1,
            preload: true,
            watch: false,
        }
    }
}

impl RunOptions {
    /// Options with the given spin count.
    pub fn new(count: u32) -> Self {
        Self {
            count,
            ..Default::default()
        }
    }

    /// Set preloading.
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// Set watching.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}

/// Reasons for stopping the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// All requested spins completed.
    Complete,
    /// User interrupted (Ctrl+C).
    UserInterrupt,
    /// The catalog has no items.
    EmptyCatalog,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Complete => write!(f, "All spins completed"),
            StopReason::UserInterrupt => write!(f, "User interrupted"),
            StopReason::EmptyCatalog => write!(f, "The wheel has no items"),
        }
    }
}

/// Result of a batch of spins.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Number of spins that landed and rendered.
    pub spins_completed: u32,
    /// Winning item of each completed spin, in order.
    pub winners: Vec<ItemId>,
    /// Spins whose result used a placeholder or text only.
    pub degraded_results: u32,
    /// Spins whose result the surface failed to show.
    pub render_failures: u32,
    /// Reason for stopping.
    pub stop_reason: StopReason,
    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl RunResult {
    fn empty(stop_reason: StopReason) -> Self {
        Self {
            spins_completed: 0,
            winners: Vec::new(),
            degraded_results: 0,
            render_failures: 0,
            stop_reason,
            duration_seconds: 0.0,
        }
    }
}
