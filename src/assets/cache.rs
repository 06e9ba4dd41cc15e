//! Per-item asset cache with in-flight load memoization.
//!
//! Each item moves through `Unloaded -> Loading -> Loaded | Failed`. While a
//! load is in flight every caller receives a clone of the same shared
//! future, so an item is never fetched twice concurrently. Failures stick
//! until [`AssetCache::invalidate`] or [`AssetCache::retry_failed`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;

use super::{AssetHandle, AssetLoader, AssetState, AssetStatus, LoadError};
use crate::catalog::{Item, ItemId};

/// A pending or settled load, cloneable across waiters.
pub type AssetLoad = Shared<BoxFuture<'static, Result<AssetHandle, LoadError>>>;

enum Slot {
    Loading(AssetLoad),
    Loaded(AssetHandle),
    Failed(LoadError),
}

struct Inner {
    loader: Arc<dyn AssetLoader>,
    load_timeout: Duration,
    slots: Mutex<HashMap<ItemId, Slot>>,
    loads_started: AtomicUsize,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, HashMap<ItemId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, id: ItemId, result: &Result<AssetHandle, LoadError>) {
        let slot = match result {
            Ok(handle) => Slot::Loaded(handle.clone()),
            Err(e) => Slot::Failed(e.clone()),
        };
        self.slots().insert(id, slot);
    }
}

/// Outcome of [`AssetCache::preload_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreloadReport {
    /// Items that loaded.
    pub loaded: Vec<ItemId>,
    /// Items that failed, with the reason.
    pub failed: Vec<(ItemId, LoadError)>,
}

impl PreloadReport {
    /// Whether every item loaded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of items that settled either way.
    pub fn total(&self) -> usize {
        self.loaded.len() + self.failed.len()
    }
}

/// Shared asset cache. Clones refer to the same records.
#[derive(Clone)]
pub struct AssetCache {
    inner: Arc<Inner>,
}

impl AssetCache {
    /// Create a cache reading through `loader`, bounding each load by
    /// `load_timeout`.
    pub fn new(loader: Arc<dyn AssetLoader>, load_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                load_timeout,
                slots: Mutex::new(HashMap::new()),
                loads_started: AtomicUsize::new(0),
            }),
        }
    }

    /// The default per-load time bound.
    pub fn load_timeout(&self) -> Duration {
        self.inner.load_timeout
    }

    /// Ensure an item's asset is loaded, using the default time bound.
    pub fn ensure_loaded(&self, item: &Item) -> AssetLoad {
        self.ensure_loaded_within(item, self.inner.load_timeout)
    }

    /// Ensure an item's asset is loaded, bounding a newly started load by
    /// `timeout`.
    ///
    /// A load that is already in flight is shared as-is and keeps its
    /// original bound.
    pub fn ensure_loaded_within(&self, item: &Item, timeout: Duration) -> AssetLoad {
        let load = {
            let mut slots = self.inner.slots();
            match slots.get(&item.id) {
                Some(Slot::Loaded(handle)) => {
                    return future::ready(Ok(handle.clone())).boxed().shared();
                }
                Some(Slot::Failed(e)) => {
                    return future::ready(Err(e.clone())).boxed().shared();
                }
                Some(Slot::Loading(load)) => return load.clone(),
                None => {}
            }

            let load = self.start_load(item.clone(), timeout);
            slots.insert(item.id, Slot::Loading(load.clone()));
            load
        };

        // Drive the load independently of the callers so it settles even if
        // every waiter goes away.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(load.clone());
        }
        load
    }

    fn start_load(&self, item: Item, timeout: Duration) -> AssetLoad {
        let inner = Arc::clone(&self.inner);
        inner.loads_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(item = item.id, asset = %item.asset_ref, ?timeout, "starting asset load");

        async move {
            let result = match tokio::time::timeout(timeout, inner.loader.load(&item)).await {
                Ok(Ok(loaded)) => Ok(AssetHandle::from_source(item.id, &item.asset_ref, loaded)),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(LoadError::Timeout {
                    location: item.asset_ref.clone(),
                    after_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

            match &result {
                Ok(handle) => {
                    tracing::debug!(item = item.id, bytes = handle.len(), "asset loaded")
                }
                Err(e) => tracing::warn!(item = item.id, error = %e, "asset load failed"),
            }
            inner.settle(item.id, &result);
            result
        }
        .boxed()
        .shared()
    }

    /// Reset a failed item to `Unloaded`. Returns whether anything changed.
    pub fn invalidate(&self, id: ItemId) -> bool {
        let mut slots = self.inner.slots();
        if matches!(slots.get(&id), Some(Slot::Failed(_))) {
            slots.remove(&id);
            true
        } else {
            false
        }
    }

    /// Invalidate every failed item. Returns how many were reset.
    pub fn retry_failed(&self) -> usize {
        let mut slots = self.inner.slots();
        let before = slots.len();
        slots.retain(|_, slot| !matches!(slot, Slot::Failed(_)));
        let reset = before - slots.len();
        if reset > 0 {
            tracing::info!(reset, "failed assets reset for retry");
        }
        reset
    }

    /// Current status of an item.
    pub fn status(&self, id: ItemId) -> AssetStatus {
        match self.inner.slots().get(&id) {
            None => AssetStatus::Unloaded,
            Some(Slot::Loading(_)) => AssetStatus::Loading,
            Some(Slot::Loaded(_)) => AssetStatus::Loaded,
            Some(Slot::Failed(_)) => AssetStatus::Failed,
        }
    }

    /// Snapshot of an item's record.
    pub fn state(&self, id: ItemId) -> AssetState {
        match self.inner.slots().get(&id) {
            Some(Slot::Loaded(handle)) => AssetState {
                status: AssetStatus::Loaded,
                handle: Some(handle.clone()),
            },
            Some(Slot::Loading(_)) => AssetState {
                status: AssetStatus::Loading,
                handle: None,
            },
            Some(Slot::Failed(_)) => AssetState {
                status: AssetStatus::Failed,
                handle: None,
            },
            None => AssetState::default(),
        }
    }

    /// The stored error of a failed item.
    pub fn failure(&self, id: ItemId) -> Option<LoadError> {
        match self.inner.slots().get(&id) {
            Some(Slot::Failed(e)) => Some(e.clone()),
            _ => None,
        }
    }

    /// Total number of loads started since the cache was created.
    pub fn loads_started(&self) -> usize {
        self.inner.loads_started.load(Ordering::Relaxed)
    }

    /// Load every item and wait until all of them settle.
    pub async fn preload_all(&self, items: &[Item], timeout: Duration) -> PreloadReport {
        let loads = items.iter().map(|item| {
            let id = item.id;
            let load = self.ensure_loaded_within(item, timeout);
            async move { (id, load.await) }
        });

        let mut report = PreloadReport::default();
        for (id, result) in future::join_all(loads).await {
            match result {
                Ok(_) => report.loaded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "preload finished"
        );
        report
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("source", &self.inner.loader.describe())
            .field("load_timeout", &self.inner.load_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::LoadedAsset;
    use std::collections::HashSet;

    /// Loader that sleeps, counts calls and fails for listed asset refs.
    struct SlowLoader {
        delay: Duration,
        calls: AtomicUsize,
        missing: Mutex<HashSet<String>>,
    }

    impl SlowLoader {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: AtomicUsize::new(0),
                missing: Mutex::new(HashSet::new()),
            })
        }

        fn set_missing(&self, asset_ref: &str, missing: bool) {
            let mut set = self.missing.lock().unwrap();
            if missing {
                set.insert(asset_ref.to_string());
            } else {
                set.remove(asset_ref);
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AssetLoader for SlowLoader {
        fn describe(&self) -> String {
            "slow".to_string()
        }

        fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(self.delay).await;
                if self.missing.lock().unwrap().contains(&item.asset_ref) {
                    return Err(LoadError::NotFound(item.asset_ref.clone()));
                }
                Ok(LoadedAsset {
                    location: item.asset_ref.clone(),
                    data: format!("<svg>{}</svg>", item.id).into_bytes(),
                })
            }
            .boxed()
        }
    }

    fn cat(id: ItemId) -> Item {
        Item::new(id, format!("cat{id}.svg"), format!("Cat {id}"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_share_one_load() {
        let loader = SlowLoader::new(Duration::from_millis(100));
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));

        let first = cache.ensure_loaded(&cat(1));
        let second = cache.ensure_loaded(&cat(1));
        assert!(Shared::ptr_eq(&first, &second));
        assert_eq!(cache.status(1), AssetStatus::Loading);

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, b);
        assert!(a.is_ok());
        assert_eq!(loader.calls(), 1);
        assert_eq!(cache.loads_started(), 1);
        assert_eq!(cache.status(1), AssetStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_item_resolves_without_new_load() {
        let loader = SlowLoader::new(Duration::from_millis(10));
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));

        let handle = cache.ensure_loaded(&cat(2)).await.unwrap();
        let again = cache.ensure_loaded(&cat(2)).await.unwrap();

        assert_eq!(handle, again);
        assert_eq!(loader.calls(), 1);
        assert_eq!(cache.state(2).handle, Some(handle));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_settles_when_caller_drops_future() {
        let loader = SlowLoader::new(Duration::from_millis(50));
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));

        drop(cache.ensure_loaded(&cat(3)));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.status(3), AssetStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_times_out() {
        let loader = SlowLoader::new(Duration::from_secs(30));
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));

        let err = cache.ensure_loaded(&cat(1)).await.unwrap_err();

        assert_eq!(
            err,
            LoadError::Timeout {
                location: "cat1.svg".to_string(),
                after_ms: 8000
            }
        );
        assert_eq!(cache.status(1), AssetStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_cached_until_invalidated() {
        let loader = SlowLoader::new(Duration::from_millis(10));
        loader.set_missing("cat5.svg", true);
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));

        assert!(cache.ensure_loaded(&cat(5)).await.is_err());
        assert!(cache.ensure_loaded(&cat(5)).await.is_err());
        assert_eq!(loader.calls(), 1);
        assert!(matches!(cache.failure(5), Some(LoadError::NotFound(_))));

        loader.set_missing("cat5.svg", false);
        assert!(cache.invalidate(5));
        assert_eq!(cache.status(5), AssetStatus::Unloaded);
        assert!(cache.ensure_loaded(&cat(5)).await.is_ok());
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_ignores_non_failed_items() {
        let loader = SlowLoader::new(Duration::from_millis(10));
        let cache = AssetCache::new(loader, Duration::from_secs(8));

        assert!(!cache.invalidate(1));
        cache.ensure_loaded(&cat(1)).await.unwrap();
        assert!(!cache.invalidate(1));
        assert_eq!(cache.status(1), AssetStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_all_waits_for_every_item() {
        let loader = SlowLoader::new(Duration::from_millis(20));
        loader.set_missing("cat2.svg", true);
        loader.set_missing("cat4.svg", true);
        let cache = AssetCache::new(loader.clone(), Duration::from_secs(8));
        let items: Vec<Item> = (1..=4).map(cat).collect();

        let report = cache.preload_all(&items, Duration::from_secs(15)).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.loaded, vec![1, 3]);
        assert_eq!(report.failed.len(), 2);
        assert!(!report.is_complete());
        assert_eq!(cache.retry_failed(), 2);
        assert_eq!(cache.status(2), AssetStatus::Unloaded);
        assert_eq!(cache.status(3), AssetStatus::Loaded);
    }
}
