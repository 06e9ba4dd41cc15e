//! Diagnostic logging.
//!
//! The core emits `tracing` events; this module installs a subscriber that
//! prints them to stderr with a timestamp, keeping stdout for the game.

use std::io::Write;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Filter used when neither `RUST_LOG` nor `--verbose` is given.
pub const DEFAULT_FILTER: &str = "warn";
/// Filter used with `--verbose`.
pub const VERBOSE_FILTER: &str = "cat_roulette=debug,warn";

/// Collects the message and structured fields of an event.
#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message.push_str(&format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

/// Layer writing one line per event to stderr.
struct StderrLayer;

impl<S: Subscriber> Layer<S> for StderrLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let line = format_line(
            &chrono::Local::now().format("%H:%M:%S%.3f").to_string(),
            *metadata.level(),
            metadata.target(),
            &visitor,
        );
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }
}

fn format_line(timestamp: &str, level: Level, target: &str, visitor: &EventVisitor) -> String {
    let tag = match level {
        Level::ERROR => "\x1b[31mERROR\x1b[0m",
        Level::WARN => "\x1b[33mWARN \x1b[0m",
        Level::INFO => "\x1b[32mINFO \x1b[0m",
        Level::DEBUG => "\x1b[36mDEBUG\x1b[0m",
        Level::TRACE => "\x1b[2mTRACE\x1b[0m",
    };
    let mut line = format!("\x1b[2m{timestamp}\x1b[0m {tag} {target}: {}", visitor.message);
    if !visitor.fields.is_empty() {
        line.push(' ');
        line.push_str(&visitor.fields.join(" "));
    }
    line
}

/// Build the filter: `RUST_LOG` wins, then `--verbose`, then `fallback`.
pub fn build_filter(verbose: bool, fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { fallback })
    })
}

/// Install the global subscriber.
///
/// Installing twice is harmless; the second call is ignored.
pub fn setup(verbose: bool, fallback: &str) {
    let subscriber = Registry::default()
        .with(build_filter(verbose, fallback))
        .with(StderrLayer);

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
