//! Rendering surfaces the wheel is drawn on.
//!
//! The engine and renderer only talk to the [`RenderSurface`] trait. The
//! terminal surface prints to stdout, the TUI surface forwards to the
//! ratatui event loop and the recording surface keeps everything in memory.

mod recording;
mod terminal;

use std::time::Duration;

use crate::render::DisplayedResult;

pub use recording::{RecordingSurface, SurfaceEvent};
pub use terminal::TerminalSurface;

/// Error type for surface operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderSurfaceError {
    /// A part of the surface the game needs is not there.
    #[error("Render surface is missing {0}")]
    MissingElement(String),
    /// Writing to the surface failed.
    #[error("Render surface I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something the wheel and its results can be drawn on.
pub trait RenderSurface: Send + Sync {
    /// Verify the surface is usable. Called once before the engine exists.
    fn check_ready(&self) -> Result<(), RenderSurfaceError>;

    /// Start animating the wheel to `target_angle` degrees over `duration`.
    ///
    /// Returns immediately; the engine owns the timing.
    fn apply_rotation(
        &self,
        target_angle: f64,
        duration: Duration,
    ) -> Result<(), RenderSurfaceError>;

    /// Mark the segment under the pointer.
    fn highlight_segment(&self, index: usize) -> Result<(), RenderSurfaceError>;

    /// Display a resolved result.
    fn show_result(&self, result: &DisplayedResult) -> Result<(), RenderSurfaceError>;
}
