//! Interactive terminal wheel for the `play` command.
//!
//! The event loop runs on a blocking thread. The engine and renderer reach
//! it through [`TuiSurface`] and [`TuiFeedback`], which forward everything
//! over a channel that the loop drains between frames.

mod app;
mod ui;

pub use app::{TuiApp, TuiEvent, TuiFeedback, TuiState, TuiStats, TuiSurface};
