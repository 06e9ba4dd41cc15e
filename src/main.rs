//! cat-roulette - spin the wheel, get a cat.
//!
//! This is the main entry point for the cat-roulette CLI.

use cat_roulette::cli::{handle_result, Cli, Commands};
use cat_roulette::logging;
use clap::Parser;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Stderr lines would tear the full-screen wheel.
    let fallback = match cli.command {
        Some(Commands::Play(_)) => "off",
        _ => logging::DEFAULT_FILTER,
    };
    logging::setup(cli.verbose, fallback);

    handle_result(cli.run())
}
