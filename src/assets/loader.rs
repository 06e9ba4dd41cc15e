//! Asset sources.
//!
//! A loader turns an item's `asset_ref` into bytes. Loaders do not time
//! out on their own; the cache bounds every load.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::LoadError;
use crate::catalog::Item;

/// Bytes read from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    /// Path or URL the bytes came from.
    pub location: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

/// A place assets can be read from.
pub trait AssetLoader: Send + Sync {
    /// Short description for logs and the `catalog` command.
    fn describe(&self) -> String;

    /// Read the asset for `item`.
    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    /// Serve assets from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The asset directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an asset reference, refusing anything that leaves the root.
    fn resolve(&self, asset_ref: &str) -> Option<PathBuf> {
        let relative = Path::new(asset_ref);
        let stays_inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        stays_inside.then(|| self.root.join(relative))
    }
}

impl AssetLoader for DirLoader {
    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }

    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
        async move {
            let path = self
                .resolve(&item.asset_ref)
                .ok_or_else(|| LoadError::NotFound(item.asset_ref.clone()))?;
            let location = path.display().to_string();

            match tokio::fs::read(&path).await {
                Ok(data) => Ok(LoadedAsset { location, data }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(LoadError::NotFound(location))
                }
                Err(e) => Err(LoadError::Transport {
                    location,
                    reason: e.to_string(),
                }),
            }
        }
        .boxed()
    }
}

/// Fetches assets over HTTP from the static file server.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLoader {
    /// Fetch assets relative to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Full URL for an asset reference.
    pub fn url_for(&self, asset_ref: &str) -> String {
        format!("{}/{}", self.base_url, asset_ref.trim_start_matches('/'))
    }
}

impl AssetLoader for HttpLoader {
    fn describe(&self) -> String {
        format!("http:{}", self.base_url)
    }

    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
        async move {
            let url = self.url_for(&item.asset_ref);
            let transport = |reason: String| LoadError::Transport {
                location: url.clone(),
                reason,
            };

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| transport(e.to_string()))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LoadError::NotFound(url));
            }
            if !status.is_success() {
                return Err(transport(format!("HTTP {status}")));
            }

            let data = response
                .bytes()
                .await
                .map_err(|e| transport(e.to_string()))?;
            Ok(LoadedAsset {
                location: url.clone(),
                data: data.to_vec(),
            })
        }
        .boxed()
    }
}

/// Tries each loader in order and returns the first success.
///
/// This is the "direct load, then fetch" chain: typically a local asset
/// directory followed by the HTTP server.
#[derive(Clone, Default)]
pub struct LayeredLoader {
    layers: Vec<Arc<dyn AssetLoader>>,
}

impl LayeredLoader {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader to the chain.
    pub fn with_layer(mut self, layer: Arc<dyn AssetLoader>) -> Self {
        self.layers.push(layer);
        self
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the chain has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl AssetLoader for LayeredLoader {
    fn describe(&self) -> String {
        if self.layers.is_empty() {
            return "none".to_string();
        }
        self.layers
            .iter()
            .map(|layer| layer.describe())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
        async move {
            let mut last_error = LoadError::NoSource(item.asset_ref.clone());
            for layer in &self.layers {
                match layer.load(item).await {
                    Ok(loaded) => return Ok(loaded),
                    Err(e) => {
                        tracing::debug!(
                            item = item.id,
                            source = %layer.describe(),
                            error = %e,
                            "asset source failed, trying next"
                        );
                        last_error = e;
                    }
                }
            }
            Err(last_error)
        }
        .boxed()
    }
}
