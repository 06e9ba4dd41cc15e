//! The spinning wheel: randomness, geometry and the spin state machine.

mod engine;
pub mod randomizer;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::ItemId;

pub use engine::{IgnoreReason, SpinEngine, SpinHandle, SpinOutcome, SpinReport, TriggerOutcome};
pub use randomizer::{
    fallback_index, fallback_rotation, generate_rotation, normalize_angle, select_index,
    RandomSource, SeededRandom, SelectionError,
};

/// Whether a spin is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// Ready for a trigger (subject to cooldown).
    #[default]
    Idle,
    /// A spin is animating; triggers are ignored.
    Spinning,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => f.write_str("idle"),
            EngineState::Spinning => f.write_str("spinning"),
        }
    }
}

/// One spin, from trigger to completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinSession {
    /// Wheel angle when the spin started, in `[0, 360)`.
    pub start_angle: f64,
    /// Rotation added by this spin.
    pub delta_angle: f64,
    /// Absolute target angle, `start_angle + delta_angle`.
    pub final_angle: f64,
    /// Winning item.
    pub selected_item_id: ItemId,
    /// Winning segment index.
    pub selected_index: usize,
    /// When the spin was triggered.
    pub started_at: DateTime<Utc>,
    /// Whether a fallback rotation or index had to be used.
    pub fallback_used: bool,
}

/// Timing and rotation bounds for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSettings {
    /// Minimum full turns per spin.
    pub min_rotations: f64,
    /// Maximum full turns per spin (exclusive).
    pub max_rotations: f64,
    /// Length of the spin animation.
    pub spin_duration: Duration,
    /// Minimum gap between spins.
    pub cooldown: Duration,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            min_rotations: 3.0,
            max_rotations: 6.0,
            spin_duration: Duration::from_millis(3000),
            cooldown: Duration::from_millis(500),
        }
    }
}
