//! Construction and wiring of the game's components.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::{AssetCache, AssetLoader, DirLoader, HttpLoader, LayeredLoader, PreloadReport};
use crate::catalog::ItemCatalog;
use crate::config::{AssetsConfig, ConfigError, RouletteConfig};
use crate::feedback::FeedbackChannel;
use crate::render::ResultRenderer;
use crate::surface::{RenderSurface, RenderSurfaceError};
use crate::wheel::{SeededRandom, SpinEngine};

/// Error type for bootstrapping.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The render surface is not usable.
    #[error("Cannot start: {0}")]
    Surface(#[from] RenderSurfaceError),
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Build the loader chain: the local directory first, then the HTTP server
/// when one is configured.
pub fn build_loader(assets: &AssetsConfig, base_dir: &Path) -> LayeredLoader {
    let mut loader =
        LayeredLoader::new().with_layer(Arc::new(DirLoader::new(base_dir.join(&assets.dir))));
    if let Some(url) = &assets.base_url {
        loader = loader.with_layer(Arc::new(HttpLoader::new(url.clone())));
    }
    loader
}

/// The assembled game: catalog, cache, renderer and engine.
pub struct Roulette {
    config: RouletteConfig,
    asset_root: PathBuf,
    catalog: Arc<ItemCatalog>,
    cache: AssetCache,
    engine: Arc<SpinEngine>,
    feedback: FeedbackChannel,
}

impl Roulette {
    /// Check the surface, then build every component once.
    ///
    /// Asset paths are resolved against `base_dir`.
    pub fn bootstrap(
        config: RouletteConfig,
        base_dir: &Path,
        surface: Arc<dyn RenderSurface>,
        feedback: FeedbackChannel,
        seed: Option<u64>,
    ) -> Result<Self, BootstrapError> {
        let loader = Arc::new(build_loader(&config.assets, base_dir));
        let asset_root = base_dir.join(&config.assets.dir);
        Self::with_loader(config, asset_root, loader, surface, feedback, seed)
    }

    /// Build the game around an explicit loader.
    pub fn with_loader(
        config: RouletteConfig,
        asset_root: PathBuf,
        loader: Arc<dyn AssetLoader>,
        surface: Arc<dyn RenderSurface>,
        feedback: FeedbackChannel,
        seed: Option<u64>,
    ) -> Result<Self, BootstrapError> {
        surface.check_ready()?;
        config.validate()?;

        let catalog = Arc::new(config.build_catalog()?);
        if !catalog.is_fairly_distributed() {
            tracing::warn!("item weights differ; segments are still selected uniformly");
        }
        tracing::info!(
            items = catalog.len(),
            source = %loader.describe(),
            seed = ?seed,
            "bootstrapping roulette"
        );

        let cache = AssetCache::new(loader, config.assets.load_timeout());
        let renderer = ResultRenderer::new(
            cache.clone(),
            surface.clone(),
            feedback.clone(),
            config.assets.retry_policy(),
        );
        let engine = SpinEngine::new(
            catalog.clone(),
            surface,
            renderer,
            feedback.clone(),
            config.wheel.settings(),
            Box::new(SeededRandom::new(seed)),
        );

        Ok(Self {
            config,
            asset_root,
            catalog,
            cache,
            engine,
            feedback,
        })
    }

    /// Configuration the game was built from.
    pub fn config(&self) -> &RouletteConfig {
        &self.config
    }

    /// Directory local assets are read from.
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// The item catalog.
    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// The asset cache.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// The spin engine.
    pub fn engine(&self) -> &Arc<SpinEngine> {
        &self.engine
    }

    /// The feedback channel.
    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }

    /// Load every item's asset, reporting the result through feedback.
    pub async fn preload(&self) -> PreloadReport {
        self.feedback
            .progress(format!("Preloading {} images...", self.catalog.len()));
        let report = self
            .cache
            .preload_all(self.catalog.all(), self.config.assets.preload_timeout())
            .await;

        if report.is_complete() {
            self.feedback
                .info(format!("Preloaded {} images", report.loaded.len()));
        } else {
            self.feedback.warning(format!(
                "Preloaded {}/{} images; missing ones will be retried when drawn",
                report.loaded.len(),
                report.total()
            ));
        }
        report
    }
}

impl std::fmt::Debug for Roulette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roulette")
            .field("engine", &self.engine)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_surface_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = Roulette::bootstrap(
            RouletteConfig::default(),
            temp.path(),
            Arc::new(RecordingSurface::missing("wheel")),
            FeedbackChannel::silent(),
            None,
        );
        assert!(matches!(result, Err(BootstrapError::Surface(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut config = RouletteConfig::default();
        config.wheel.max_rotations = 1.0;
        let result = Roulette::bootstrap(
            config,
            temp.path(),
            Arc::new(RecordingSurface::new()),
            FeedbackChannel::silent(),
            None,
        );
        assert!(matches!(result, Err(BootstrapError::Config(_))));
    }

    #[test]
    fn test_loader_chain_includes_http_when_configured() {
        let mut assets = AssetsConfig::default();
        assert_eq!(build_loader(&assets, Path::new("/srv")).len(), 1);

        assets.base_url = Some("http://localhost:3000/images".into());
        let loader = build_loader(&assets, Path::new("/srv"));
        assert_eq!(loader.len(), 2);
        assert_eq!(
            loader.describe(),
            "dir:/srv/images -> http:http://localhost:3000/images"
        );
    }

    #[tokio::test]
    async fn test_preload_reads_asset_directory() {
        let temp = TempDir::new().unwrap();
        let images = temp.path().join("images");
        fs::create_dir_all(&images).unwrap();
        for i in 1..=7 {
            fs::write(images.join(format!("cat{i}.svg")), "<svg/>").unwrap();
        }

        let roulette = Roulette::bootstrap(
            RouletteConfig::default(),
            temp.path(),
            Arc::new(RecordingSurface::new()),
            FeedbackChannel::silent(),
            Some(1),
        )
        .unwrap();
        let report = roulette.preload().await;

        assert_eq!(report.loaded.len(), 7);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 8);
        assert_eq!(roulette.asset_root(), images.as_path());
    }
}
