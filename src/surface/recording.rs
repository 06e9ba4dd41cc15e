//! In-memory surface for tests and headless runs.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{RenderSurface, RenderSurfaceError};
use crate::render::DisplayedResult;

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// `apply_rotation` was called.
    Rotation {
        /// Absolute target angle.
        target_angle: f64,
        /// Animation length.
        duration: Duration,
    },
    /// `highlight_segment` was called.
    Highlight(usize),
    /// `show_result` succeeded.
    Result(DisplayedResult),
}

/// Surface that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    missing: Option<String>,
    fail_show: Mutex<bool>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose readiness check reports `element` as missing.
    pub fn missing(element: impl Into<String>) -> Self {
        Self {
            missing: Some(element.into()),
            ..Self::default()
        }
    }

    /// Make subsequent `show_result` calls fail with an I/O error.
    pub fn set_fail_show(&self, fail: bool) {
        *self.fail_show.lock().unwrap_or_else(PoisonError::into_inner) = fail;
    }

    fn events_mut(&self) -> MutexGuard<'_, Vec<SurfaceEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every recorded call, in order.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events_mut().clone()
    }

    /// Results shown so far.
    pub fn results(&self) -> Vec<DisplayedResult> {
        self.events_mut()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Result(result) => Some(result.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of rotations started.
    pub fn rotation_count(&self) -> usize {
        self.events_mut()
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::Rotation { .. }))
            .count()
    }

    /// The most recent highlighted segment.
    pub fn last_highlight(&self) -> Option<usize> {
        self.events_mut().iter().rev().find_map(|event| match event {
            SurfaceEvent::Highlight(index) => Some(*index),
            _ => None,
        })
    }
}

impl RenderSurface for RecordingSurface {
    fn check_ready(&self) -> Result<(), RenderSurfaceError> {
        match &self.missing {
            Some(element) => Err(RenderSurfaceError::MissingElement(element.clone())),
            None => Ok(()),
        }
    }

    fn apply_rotation(
        &self,
        target_angle: f64,
        duration: Duration,
    ) -> Result<(), RenderSurfaceError> {
        self.events_mut().push(SurfaceEvent::Rotation {
            target_angle,
            duration,
        });
        Ok(())
    }

    fn highlight_segment(&self, index: usize) -> Result<(), RenderSurfaceError> {
        self.events_mut().push(SurfaceEvent::Highlight(index));
        Ok(())
    }

    fn show_result(&self, result: &DisplayedResult) -> Result<(), RenderSurfaceError> {
        if *self.fail_show.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(RenderSurfaceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "result area unavailable",
            )));
        }
        self.events_mut().push(SurfaceEvent::Result(result.clone()));
        Ok(())
    }
}
