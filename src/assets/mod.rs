//! Item artwork: loading, caching and placeholder synthesis.

mod cache;
mod loader;
mod placeholder;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::ItemId;

pub use cache::{AssetCache, AssetLoad, PreloadReport};
pub use loader::{AssetLoader, DirLoader, HttpLoader, LayeredLoader, LoadedAsset};
pub use placeholder::{synthesize_placeholder, PlaceholderError, PLACEHOLDER_REASON};

/// Fallback media type for unknown extensions.
pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Load status of one item's asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetStatus {
    /// Never requested (or reset after a failure).
    #[default]
    Unloaded,
    /// A load is in flight.
    Loading,
    /// Loaded and cached.
    Loaded,
    /// The last load failed; stays failed until invalidated.
    Failed,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetStatus::Unloaded => "unloaded",
            AssetStatus::Loading => "loading",
            AssetStatus::Loaded => "loaded",
            AssetStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Snapshot of a cache record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetState {
    /// Current status.
    pub status: AssetStatus,
    /// The loaded asset, present only when `status` is `Loaded`.
    pub handle: Option<AssetHandle>,
}

/// Where the bytes of a handle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    /// Read from an asset source.
    Source,
    /// Generated locally because every load failed.
    Placeholder,
}

/// A loaded (or synthesized) image, cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetHandle {
    /// Item the asset belongs to.
    pub item_id: ItemId,
    /// Path or URL the bytes came from.
    pub location: String,
    /// MIME type derived from the asset extension.
    pub media_type: &'static str,
    /// Raw bytes.
    pub data: Arc<[u8]>,
    /// Source or placeholder.
    pub origin: AssetOrigin,
}

impl AssetHandle {
    /// Handle for bytes read from an asset source.
    pub fn from_source(item_id: ItemId, asset_ref: &str, loaded: LoadedAsset) -> Self {
        Self {
            item_id,
            location: loaded.location,
            media_type: media_type_for(asset_ref),
            data: loaded.data.into(),
            origin: AssetOrigin::Source,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the asset has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this is a synthesized placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.origin == AssetOrigin::Placeholder
    }

    /// The bytes as UTF-8 text, for vector formats.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Error type for asset loads.
///
/// Cloneable because one in-flight load hands its outcome to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The load did not settle within its time bound.
    #[error("Timed out after {after_ms} ms loading {location}")]
    Timeout {
        /// Asset that was being loaded.
        location: String,
        /// The bound that expired.
        after_ms: u64,
    },
    /// The source has no such asset.
    #[error("Asset not found: {0}")]
    NotFound(String),
    /// I/O or HTTP failure.
    #[error("Failed to load {location}: {reason}")]
    Transport {
        /// Asset that was being loaded.
        location: String,
        /// Underlying error message.
        reason: String,
    },
    /// No asset source is configured.
    #[error("No asset source configured for {0}")]
    NoSource(String),
}

/// MIME type for an asset path, by extension.
pub fn media_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("js") => "text/javascript",
        Some("css") => "text/css",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("json") => "application/json",
        _ => DEFAULT_MEDIA_TYPE,
    }
}
