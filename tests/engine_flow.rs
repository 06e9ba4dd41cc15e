//! End-to-end spin tests through the public API.
//!
//! Time is paused, so spin timers, cooldowns and retry backoff run instantly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cat_roulette::assets::{AssetCache, AssetLoader, LoadError, LoadedAsset};
use cat_roulette::catalog::{Item, ItemCatalog};
use cat_roulette::feedback::FeedbackChannel;
use cat_roulette::render::{ResultImage, ResultRenderer, RetryPolicy};
use cat_roulette::surface::RecordingSurface;
use cat_roulette::wheel::{
    normalize_angle, select_index, EngineState, IgnoreReason, SeededRandom, SpinEngine,
    WheelSettings,
};
use futures::future::BoxFuture;

/// In-memory asset source that counts its loads.
struct Shelf {
    available: bool,
    loads: AtomicUsize,
}

impl Shelf {
    fn new(available: bool) -> Arc<Self> {
        Arc::new(Self {
            available,
            loads: AtomicUsize::new(0),
        })
    }
}

impl AssetLoader for Shelf {
    fn describe(&self) -> String {
        "shelf".into()
    }

    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let result = if self.available {
            Ok(LoadedAsset {
                location: format!("shelf:{}", item.asset_ref),
                data: b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec(),
            })
        } else {
            Err(LoadError::NotFound(item.asset_ref.clone()))
        };
        Box::pin(async move { result })
    }
}

/// Takes five seconds to answer the first load, then answers at once.
struct SlowFirst {
    loads: AtomicUsize,
}

impl AssetLoader for SlowFirst {
    fn describe(&self) -> String {
        "slow-first".into()
    }

    fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
        let first = self.loads.fetch_add(1, Ordering::SeqCst) == 0;
        Box::pin(async move {
            if first {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(LoadedAsset {
                location: format!("slow:{}", item.asset_ref),
                data: b"<svg/>".to_vec(),
            })
        })
    }
}

fn engine(
    loader: Arc<dyn AssetLoader>,
    surface: Arc<RecordingSurface>,
    seed: u64,
) -> Arc<SpinEngine> {
    let catalog = Arc::new(ItemCatalog::default_cats());
    let cache = AssetCache::new(loader, Duration::from_secs(8));
    let renderer = ResultRenderer::new(
        cache,
        surface.clone(),
        FeedbackChannel::silent(),
        RetryPolicy::default(),
    );
    SpinEngine::new(
        catalog,
        surface,
        renderer,
        FeedbackChannel::silent(),
        WheelSettings::default(),
        Box::new(SeededRandom::from_seed(seed)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_single_spin_lands_and_shows_winner() {
    let surface = Arc::new(RecordingSurface::new());
    let engine = engine(Shelf::new(true), surface.clone(), 42);

    let handle = engine.trigger().started().expect("spin should start");
    let session = handle.session().clone();
    assert_eq!(engine.state(), EngineState::Spinning);

    let outcome = handle.wait().await;
    let report = outcome.report().expect("spin should complete");

    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.spins_completed(), 1);
    let angle = engine.current_angle();
    assert!((0.0..360.0).contains(&angle), "angle {angle}");

    let index = select_index(session.final_angle, 8).unwrap();
    assert_eq!(index, session.selected_index);
    assert_eq!(report.item.id, session.selected_item_id);

    let results = surface.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].item_id, session.selected_item_id);
    assert!(results[0].has_real_image());
    assert_eq!(surface.last_highlight(), Some(index));
}

#[tokio::test(start_paused = true)]
async fn test_trigger_while_spinning_is_ignored() {
    let surface = Arc::new(RecordingSurface::new());
    let engine = engine(Shelf::new(true), surface.clone(), 1);

    let handle = engine.trigger().started().unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    let second = engine.trigger();
    assert_eq!(second.ignored(), Some(IgnoreReason::Spinning));

    handle.wait().await;
    assert_eq!(surface.rotation_count(), 1);
    assert_eq!(surface.results().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_image_falls_back_to_placeholder() {
    let surface = Arc::new(RecordingSurface::new());
    let shelf = Shelf::new(false);
    let engine = engine(shelf.clone(), surface.clone(), 9);

    let outcome = engine.trigger().started().unwrap().wait().await;
    let report = outcome.report().unwrap();

    // First attempt plus two retries.
    assert_eq!(report.render.load_attempts, 3);
    assert_eq!(shelf.loads.load(Ordering::SeqCst), 3);
    assert!(matches!(report.render.displayed.image, ResultImage::Placeholder(_)));
    assert!(!surface.results()[0].has_real_image());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_after_completion() {
    let surface = Arc::new(RecordingSurface::new());
    let engine = engine(Shelf::new(true), surface.clone(), 3);

    engine.trigger().started().unwrap().wait().await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    match engine.trigger().ignored() {
        Some(IgnoreReason::Cooldown { remaining }) => {
            assert!(remaining <= Duration::from_millis(400));
            assert!(!remaining.is_zero());
        }
        other => panic!("expected cooldown, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(400)).await;
    let next = engine.trigger().started().expect("cooldown should have passed");
    next.wait().await;
    assert_eq!(engine.spins_completed(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_spin_in_flight() {
    let surface = Arc::new(RecordingSurface::new());
    let engine = engine(Shelf::new(true), surface.clone(), 5);

    let handle = engine.trigger().started().unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    engine.shutdown();

    assert!(handle.wait().await.is_cancelled());
    assert!(surface.results().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.trigger().ignored(), Some(IgnoreReason::ShutDown));
}

#[tokio::test(start_paused = true)]
async fn test_empty_catalog_never_spins() {
    let surface = Arc::new(RecordingSurface::new());
    let cache = AssetCache::new(Shelf::new(true), Duration::from_secs(8));
    let renderer = ResultRenderer::new(
        cache,
        surface.clone(),
        FeedbackChannel::silent(),
        RetryPolicy::default(),
    );
    let engine = SpinEngine::new(
        Arc::new(ItemCatalog::default()),
        surface.clone(),
        renderer,
        FeedbackChannel::silent(),
        WheelSettings::default(),
        Box::new(SeededRandom::from_seed(0)),
    );

    assert_eq!(engine.trigger().ignored(), Some(IgnoreReason::EmptyCatalog));
    assert_eq!(surface.rotation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_render_keeps_wheel_busy_until_result_shows() {
    let surface = Arc::new(RecordingSurface::new());
    let loader = Arc::new(SlowFirst {
        loads: AtomicUsize::new(0),
    });
    let engine = engine(loader, surface.clone(), 0);

    let first = engine.trigger().started().unwrap();
    let first_session = first.session().clone();

    // Landed at 3s, image still loading until 8s.
    tokio::time::sleep(Duration::from_millis(3600)).await;
    assert_eq!(engine.state(), EngineState::Spinning);
    assert_eq!(engine.trigger().ignored(), Some(IgnoreReason::Spinning));
    assert_eq!(
        engine.current_angle(),
        normalize_angle(first_session.final_angle)
    );
    assert!(surface.results().is_empty());

    first.wait().await;
    assert_eq!(engine.state(), EngineState::Idle);

    tokio::time::sleep(Duration::from_millis(500)).await;
    let second = engine.trigger().started().unwrap();
    let second_session = second.session().clone();
    second.wait().await;

    let shown: Vec<_> = surface.results().iter().map(|r| r.item_id).collect();
    assert_eq!(
        shown,
        vec![first_session.selected_item_id, second_session.selected_item_id]
    );
    assert_eq!(surface.last_highlight(), Some(second_session.selected_index));
    assert_eq!(surface.rotation_count(), 2);
}
