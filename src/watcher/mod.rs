//! Asset directory monitoring.
//!
//! When images appear or change on disk, items whose loads failed are reset
//! so the next spin tries them again.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::assets::AssetCache;
use crate::feedback::FeedbackChannel;

/// Watches the asset directory and retries failed loads on changes.
pub struct AssetWatcher {
    root: PathBuf,
    cache: AssetCache,
    feedback: FeedbackChannel,
    watcher: Option<RecommendedWatcher>,
    resets: Arc<AtomicUsize>,
}

impl AssetWatcher {
    /// Create a watcher for `root` feeding `cache`. Resets are reported on
    /// `feedback`. Call [`start`](Self::start) to begin watching.
    pub fn new(root: impl AsRef<Path>, cache: AssetCache, feedback: FeedbackChannel) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cache,
            feedback,
            watcher: None,
            resets: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Start watching.
    pub fn start(&mut self) -> Result<(), notify::Error> {
        if self.watcher.is_some() {
            return Ok(());
        }

        let cache = self.cache.clone();
        let feedback = self.feedback.clone();
        let resets = self.resets.clone();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    let reset = handle_event(&event, &cache, &feedback);
                    resets.fetch_add(reset, Ordering::Relaxed);
                }
                Err(e) => tracing::warn!(error = %e, "asset watcher error"),
            },
            Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        tracing::info!(root = %self.root.display(), "watching asset directory");
        self.watcher = Some(watcher);
        Ok(())
    }

    /// Stop watching.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            let _ = watcher.unwatch(&self.root);
        }
    }

    /// Whether the watcher is running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Total failed items reset because of file changes.
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::Relaxed)
    }
}

impl Drop for AssetWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reset failed loads if files appeared or changed. Returns how many items
/// were reset.
fn handle_event(event: &Event, cache: &AssetCache, feedback: &FeedbackChannel) -> usize {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return 0;
    }

    let reset = cache.retry_failed();
    if reset > 0 {
        tracing::info!(reset, paths = ?event.paths, "asset files changed, retrying failed loads");
        feedback.info(format!("Images changed on disk; retrying {reset} failed load(s)"));
    }
    reset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetStatus, DirLoader};
    use crate::catalog::Item;
    use crate::feedback::{FeedbackSink, Notification};
    use notify::event::{CreateKind, RemoveKind};
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl FeedbackSink for Collect {
        fn notify(&self, notification: &Notification) {
            self.0.lock().unwrap().push(notification.message.clone());
        }
    }

    fn failed_cache(root: &Path) -> (AssetCache, Item) {
        let cache = AssetCache::new(Arc::new(DirLoader::new(root)), Duration::from_secs(1));
        (cache, Item::new(1, "cat1.svg", "One"))
    }

    #[tokio::test]
    async fn test_create_event_resets_failed_items() {
        let temp = TempDir::new().unwrap();
        let (cache, item) = failed_cache(temp.path());
        assert!(cache.ensure_loaded(&item).await.is_err());
        assert_eq!(cache.status(1), AssetStatus::Failed);

        fs::write(temp.path().join("cat1.svg"), "<svg/>").unwrap();
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(temp.path().join("cat1.svg"));
        let sink = Arc::new(Collect::default());
        let feedback = FeedbackChannel::new(sink.clone());

        assert_eq!(handle_event(&event, &cache, &feedback), 1);
        assert_eq!(cache.status(1), AssetStatus::Unloaded);
        assert!(cache.ensure_loaded(&item).await.is_ok());

        let messages = sink.0.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("retrying 1 failed"));
    }

    #[tokio::test]
    async fn test_remove_event_resets_nothing() {
        let temp = TempDir::new().unwrap();
        let (cache, item) = failed_cache(temp.path());
        assert!(cache.ensure_loaded(&item).await.is_err());

        let event = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(temp.path().join("cat1.svg"));
        let sink = Arc::new(Collect::default());
        let feedback = FeedbackChannel::new(sink.clone());

        assert_eq!(handle_event(&event, &cache, &feedback), 0);
        assert_eq!(cache.status(1), AssetStatus::Failed);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_change_without_failures_is_quiet() {
        let temp = TempDir::new().unwrap();
        let (cache, _) = failed_cache(temp.path());
        let sink = Arc::new(Collect::default());
        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(temp.path().join("new.svg"));
        let feedback = FeedbackChannel::new(sink.clone());

        assert_eq!(handle_event(&event, &cache, &feedback), 0);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_start_and_stop() {
        let temp = TempDir::new().unwrap();
        let (cache, _) = failed_cache(temp.path());
        let mut watcher = AssetWatcher::new(temp.path(), cache, FeedbackChannel::silent());

        assert!(!watcher.is_running());
        watcher.start().unwrap();
        assert!(watcher.is_running());
        watcher.start().unwrap();
        watcher.stop();
        assert!(!watcher.is_running());
        assert_eq!(watcher.resets(), 0);
    }

    #[test]
    fn test_start_on_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let (cache, _) = failed_cache(temp.path());
        let mut watcher =
            AssetWatcher::new(temp.path().join("missing"), cache, FeedbackChannel::silent());
        assert!(watcher.start().is_err());
        assert!(!watcher.is_running());
    }
}
