//! Line-oriented terminal surface.

use std::io::{self, IsTerminal, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{RenderSurface, RenderSurfaceError};
use crate::feedback::{get_sparkle_char, Spinner};
use crate::render::{DisplayedResult, ResultImage};

/// Draws the wheel as a spinner line and results as short text blocks.
pub struct TerminalSurface {
    labels: Vec<String>,
    animate: bool,
    spinner: Mutex<Option<Spinner>>,
}

impl TerminalSurface {
    /// Create a surface for a wheel with the given segment labels.
    ///
    /// The spinner animation is only used when stdout is a terminal.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            animate: io::stdout().is_terminal(),
            spinner: Mutex::new(None),
        }
    }

    /// Force the animation on or off.
    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    fn stop_spinner(&self) {
        let spinner = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(spinner) = spinner {
            spinner.stop();
        }
    }
}

impl RenderSurface for TerminalSurface {
    fn check_ready(&self) -> Result<(), RenderSurfaceError> {
        io::stdout().flush()?;
        Ok(())
    }

    fn apply_rotation(
        &self,
        target_angle: f64,
        duration: Duration,
    ) -> Result<(), RenderSurfaceError> {
        tracing::trace!(target_angle, ?duration, "terminal rotation");
        if !self.animate {
            return Ok(());
        }
        // A rotation never overlaps another; clear any leftover spinner first.
        self.stop_spinner();
        let spinner = Spinner::start("The wheel is spinning!", duration);
        *self.spinner.lock().unwrap_or_else(PoisonError::into_inner) = Some(spinner);
        Ok(())
    }

    fn highlight_segment(&self, index: usize) -> Result<(), RenderSurfaceError> {
        self.stop_spinner();
        let label = self
            .labels
            .get(index)
            .ok_or_else(|| RenderSurfaceError::MissingElement(format!("segment {index}")))?;
        let mut stdout = io::stdout().lock();
        writeln!(
            stdout,
            "\x1b[33m{}\x1b[0m Segment {} \x1b[2m({})\x1b[0m",
            get_sparkle_char(index),
            index + 1,
            label
        )?;
        Ok(())
    }

    fn show_result(&self, result: &DisplayedResult) -> Result<(), RenderSurfaceError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "\x1b[1mResult:\x1b[0m {}", result.caption())?;
        match &result.image {
            ResultImage::Loaded(handle) => writeln!(
                stdout,
                "  \x1b[2mimage: {} ({}, {} bytes)\x1b[0m",
                handle.location,
                handle.media_type,
                handle.len()
            )?,
            ResultImage::Placeholder(_) => writeln!(
                stdout,
                "  \x1b[33mimage: placeholder for {}\x1b[0m",
                result.asset_ref
            )?,
            ResultImage::TextOnly => {}
        }
        stdout.flush()?;
        Ok(())
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
