//! Preload command implementation.
//!
//! Loads every item's image once and reports which ones settled as failed.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::assets::PreloadReport;
use crate::cli::output::{print_json, OutputError};
use crate::config::{ConfigError, RouletteConfig};
use crate::feedback::{DisplayMode, FeedbackChannel, TerminalFeedback};
use crate::runner::{BootstrapError, Roulette};
use crate::surface::RecordingSurface;

/// Error type for preload command operations.
#[derive(Debug, thiserror::Error)]
pub enum PreloadCommandError {
    /// Failed to load the configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// The game could not start.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Failed to print the report.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Execute the preload command.
pub async fn preload(
    config_path: Option<&Path>,
    json: bool,
) -> Result<PreloadReport, PreloadCommandError> {
    let config = RouletteConfig::load(config_path)?;
    let feedback = if json {
        FeedbackChannel::silent()
    } else {
        FeedbackChannel::new(Arc::new(TerminalFeedback::new(
            DisplayMode::Minimal,
            false,
        )))
    };

    // Nothing is drawn; the recording surface only satisfies the readiness check.
    let roulette = Roulette::bootstrap(
        config,
        Path::new("."),
        Arc::new(RecordingSurface::new()),
        feedback,
        None,
    )?;
    let report = roulette.preload().await;

    if json {
        print_json(&report_json(&report))?;
    } else {
        for (id, error) in &report.failed {
            let label = roulette
                .catalog()
                .by_id(*id)
                .map(|item| item.label.as_str())
                .unwrap_or("?");
            println!("  \x1b[31m✗\x1b[0m {id} {label}: {error}");
        }
    }
    Ok(report)
}

fn report_json(report: &PreloadReport) -> serde_json::Value {
    json!({
        "loaded": report.loaded,
        "failed": report
            .failed
            .iter()
            .map(|(id, error)| json!({ "id": id, "error": error.to_string() }))
            .collect::<Vec<_>>(),
        "complete": report.is_complete(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LoadError;

    #[test]
    fn test_report_json_shape() {
        let report = PreloadReport {
            loaded: vec![1, 2],
            failed: vec![(3, LoadError::NotFound("cat3.svg".into()))],
        };
        let value = report_json(&report);
        assert_eq!(value["loaded"], json!([1, 2]));
        assert_eq!(value["failed"][0]["id"], json!(3));
        assert_eq!(value["complete"], json!(false));
        assert!(value["failed"][0]["error"]
            .as_str()
            .unwrap()
            .contains("cat3.svg"));
    }
}
