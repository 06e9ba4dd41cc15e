//! cat-roulette - spin the wheel, get a cat.
//!
//! This library provides the selection engine, asset pipeline and result
//! rendering behind the cat-roulette CLI. A spin picks a segment uniformly at
//! random, animates the wheel towards it and renders the winning item's
//! image, falling back to a generated placeholder when the image never loads.
//!
//! The pieces fit together through [`runner::Roulette`], which wires a
//! [`config::RouletteConfig`] to a [`surface::RenderSurface`] and a
//! [`feedback::FeedbackSink`].

#![deny(missing_docs)]

/// Version string from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assets;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod feedback;
pub mod logging;
pub mod render;
pub mod runner;
pub mod surface;
pub mod tui;
pub mod watcher;
pub mod wheel;

pub use catalog::{Item, ItemCatalog, ItemId};
pub use wheel::{SpinEngine, SpinOutcome};
