//! Catalog command implementation.
//!
//! Lists the wheel's items with the arc each segment covers.

use std::path::Path;

use serde::Serialize;

use crate::catalog::{Item, ItemCatalog};
use crate::cli::output::{print_json, OutputError};
use crate::config::{ConfigError, RouletteConfig};

/// Error type for catalog command operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogCommandError {
    /// Failed to load or validate the configuration.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// Failed to print the catalog.
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow<'a> {
    /// Segment index.
    pub index: usize,
    /// Segment centre, degrees clockwise from the pointer at rest.
    pub centre_angle: f64,
    /// The item.
    #[serde(flatten)]
    pub item: &'a Item,
}

/// Build the rows for a catalog.
pub fn rows(catalog: &ItemCatalog) -> Vec<CatalogRow<'_>> {
    let segment = catalog.segment_angle().unwrap_or(0.0);
    catalog
        .all()
        .iter()
        .enumerate()
        .map(|(index, item)| CatalogRow {
            index,
            centre_angle: index as f64 * segment,
            item,
        })
        .collect()
}

/// Execute the catalog command.
pub fn catalog(config_path: Option<&Path>, json: bool) -> Result<(), CatalogCommandError> {
    let config = RouletteConfig::load(config_path)?;
    let catalog = config.build_catalog()?;
    let rows = rows(&catalog);

    if json {
        print_json(&rows)?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("\x1b[2mThe wheel has no items.\x1b[0m");
        return Ok(());
    }

    println!(
        "\x1b[1m{} items\x1b[0m \x1b[2m({:.1}° per segment)\x1b[0m",
        catalog.len(),
        catalog.segment_angle().unwrap_or(0.0)
    );
    for row in &rows {
        println!(
            "  {:>2}  \x1b[36m{:<12}\x1b[0m {:>6.1}°  {}",
            row.item.id, row.item.asset_ref, row.centre_angle, row.item.label
        );
    }
    if !catalog.is_fairly_distributed() {
        println!();
        println!("\x1b[33mNote:\x1b[0m weights differ, but every segment is equally likely.");
    }
    Ok(())
}
