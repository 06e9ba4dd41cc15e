//! Command implementations for the cat-roulette CLI.
//!
//! This module contains the actual implementations of CLI commands,
//! separated from the argument parsing definitions in cli/mod.rs.

pub mod catalog;
pub mod completions;
pub mod config;
pub mod init;
pub mod play;
pub mod preload;
pub mod spin;
