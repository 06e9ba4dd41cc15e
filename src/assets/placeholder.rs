//! Placeholder artwork for items whose asset could not be loaded.

use std::sync::Arc;

use tera::{Context, Tera};

use super::{AssetHandle, AssetOrigin};
use crate::catalog::Item;

/// Reason line printed on every placeholder.
pub const PLACEHOLDER_REASON: &str = "File not found or failed to load";

const TEMPLATE_NAME: &str = "placeholder.svg";

const PLACEHOLDER_TEMPLATE: &str = r##"<svg width="300" height="200" viewBox="0 0 300 200" xmlns="http://www.w3.org/2000/svg">
  <rect width="100%" height="100%" rx="8" fill="#f8f9fa" stroke="#dee2e6" stroke-width="2"/>
  <text x="50%" y="30%" text-anchor="middle" font-family="sans-serif" font-size="32" fill="#6c757d">=^.^=</text>
  <text x="50%" y="55%" text-anchor="middle" font-family="sans-serif" font-size="14" fill="#6c757d">{{ label }}</text>
  <text x="50%" y="75%" text-anchor="middle" font-family="sans-serif" font-size="12" fill="#adb5bd">Image: {{ asset_ref }}</text>
  <text x="50%" y="90%" text-anchor="middle" font-family="sans-serif" font-size="10" fill="#adb5bd">{{ reason }}</text>
</svg>
"##;

/// Error type for placeholder synthesis.
#[derive(Debug, thiserror::Error)]
#[error("Failed to render placeholder: {0}")]
pub struct PlaceholderError(#[from] tera::Error);

/// Build an SVG placeholder naming the item and its missing asset.
///
/// Labels and paths are XML-escaped, so arbitrary catalog text cannot break
/// the markup.
pub fn synthesize_placeholder(item: &Item) -> Result<AssetHandle, PlaceholderError> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![".svg"]);
    tera.add_raw_template(TEMPLATE_NAME, PLACEHOLDER_TEMPLATE)?;

    let mut context = Context::new();
    context.insert("label", &item.label);
    context.insert("asset_ref", &item.asset_ref);
    context.insert("reason", PLACEHOLDER_REASON);

    let svg = tera.render(TEMPLATE_NAME, &context)?;

    Ok(AssetHandle {
        item_id: item.id,
        location: format!("placeholder:{}", item.asset_ref),
        media_type: "image/svg+xml",
        data: Arc::from(svg.into_bytes()),
        origin: AssetOrigin::Placeholder,
    })
}
