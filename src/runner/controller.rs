//! Spin controller for running a batch of spins.
//!
//! Triggers spins back to back, waiting out the cooldown in between, until
//! the requested count is reached or the user interrupts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::{Roulette, RunOptions, RunResult, StopReason};
use crate::watcher::AssetWatcher;
use crate::wheel::{IgnoreReason, SpinOutcome, SpinReport, TriggerOutcome};

/// Poll interval when a trigger lands while a spin is still in flight.
const BUSY_POLL: Duration = Duration::from_millis(50);

/// Drives spins on a bootstrapped [`Roulette`].
pub struct SpinController {
    roulette: Roulette,
    interrupted: Arc<AtomicBool>,
}

impl SpinController {
    /// Create a controller.
    pub fn new(roulette: Roulette) -> Self {
        Self {
            roulette,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The game being driven.
    pub fn roulette(&self) -> &Roulette {
        &self.roulette
    }

    /// Get the interrupt flag for external signaling.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Stop after the current step and cancel any spin in flight.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.roulette.engine().shutdown();
    }

    /// Route Ctrl+C to [`interrupt`](Self::interrupt).
    ///
    /// Can only be installed once per process.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.interrupted.clone();
        let engine = self.roulette.engine().clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            engine.shutdown();
        })
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Run spins until `options.count` have completed.
    pub async fn run(&self, options: &RunOptions) -> RunResult {
        let started = Instant::now();
        let engine = self.roulette.engine();

        if self.roulette.catalog().is_empty() {
            self.roulette
                .feedback()
                .warning("There is nothing on the wheel to spin");
            return RunResult::empty(StopReason::EmptyCatalog);
        }

        if options.preload {
            tokio::select! {
                _ = self.roulette.preload() => {}
                _ = engine.stopped() => tracing::info!("preload interrupted"),
            }
        }

        let watcher = options.watch.then(|| self.start_watcher()).flatten();

        let mut result = RunResult::empty(StopReason::Complete);
        while result.spins_completed < options.count {
            if self.is_interrupted() {
                result.stop_reason = StopReason::UserInterrupt;
                break;
            }

            match engine.trigger() {
                TriggerOutcome::Started(handle) => {
                    tracing::debug!(
                        spin = result.spins_completed + 1,
                        of = options.count,
                        "waiting for spin"
                    );
                    match handle.wait().await {
                        SpinOutcome::Completed(report) => record(&mut result, &report),
                        SpinOutcome::Cancelled => {
                            result.stop_reason = StopReason::UserInterrupt;
                            break;
                        }
                    }
                }
                TriggerOutcome::Ignored(IgnoreReason::Cooldown { remaining }) => {
                    tokio::time::sleep(remaining).await;
                }
                TriggerOutcome::Ignored(IgnoreReason::Spinning) => {
                    tokio::time::sleep(BUSY_POLL).await;
                }
                TriggerOutcome::Ignored(IgnoreReason::EmptyCatalog) => {
                    result.stop_reason = StopReason::EmptyCatalog;
                    break;
                }
                TriggerOutcome::Ignored(IgnoreReason::ShutDown) => {
                    result.stop_reason = StopReason::UserInterrupt;
                    break;
                }
            }
        }

        if let Some(watcher) = watcher {
            tracing::debug!(resets = watcher.resets(), "stopped watching assets");
        }

        result.duration_seconds = started.elapsed().as_secs_f64();
        tracing::info!(
            spins = result.spins_completed,
            reason = %result.stop_reason,
            "run finished"
        );
        result
    }

    fn start_watcher(&self) -> Option<AssetWatcher> {
        let mut watcher = AssetWatcher::new(
            self.roulette.asset_root(),
            self.roulette.cache().clone(),
            self.roulette.feedback().clone(),
        );
        match watcher.start() {
            Ok(()) => Some(watcher),
            Err(e) => {
                tracing::warn!(error = %e, "could not watch asset directory");
                None
            }
        }
    }
}

fn record(result: &mut RunResult, report: &SpinReport) {
    result.spins_completed += 1;
    result.winners.push(report.item.id);
    if !report.render.displayed.has_real_image() {
        result.degraded_results += 1;
    }
    if report.render.surface_error.is_some() {
        result.render_failures += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetLoader, LoadError, LoadedAsset};
    use crate::catalog::Item;
    use crate::config::RouletteConfig;
    use crate::feedback::FeedbackChannel;
    use crate::surface::RecordingSurface;
    use futures::future::BoxFuture;
    use std::path::PathBuf;

    /// Serves every item from memory, or fails every item.
    struct Memory {
        available: bool,
    }

    /// Never answers within the preload bound.
    struct Stalled;

    impl AssetLoader for Stalled {
        fn describe(&self) -> String {
            "stalled".into()
        }

        fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(LoadError::NotFound(item.asset_ref.clone()))
            })
        }
    }

    impl AssetLoader for Memory {
        fn describe(&self) -> String {
            "memory".into()
        }

        fn load<'a>(&'a self, item: &'a Item) -> BoxFuture<'a, Result<LoadedAsset, LoadError>> {
            let result = if self.available {
                Ok(LoadedAsset {
                    location: format!("memory:{}", item.asset_ref),
                    data: b"<svg/>".to_vec(),
                })
            } else {
                Err(LoadError::NotFound(item.asset_ref.clone()))
            };
            Box::pin(async move { result })
        }
    }

    fn controller(
        config: RouletteConfig,
        available: bool,
        surface: Arc<RecordingSurface>,
    ) -> SpinController {
        let roulette = Roulette::with_loader(
            config,
            PathBuf::from("images"),
            Arc::new(Memory { available }),
            surface,
            FeedbackChannel::silent(),
            Some(7),
        )
        .unwrap();
        SpinController::new(roulette)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_requested_number_of_spins() {
        let surface = Arc::new(RecordingSurface::new());
        let controller = controller(RouletteConfig::default(), true, surface.clone());

        let result = controller.run(&RunOptions::new(3)).await;

        assert_eq!(result.stop_reason, StopReason::Complete);
        assert_eq!(result.spins_completed, 3);
        assert_eq!(result.winners.len(), 3);
        assert_eq!(result.degraded_results, 0);
        assert_eq!(surface.results().len(), 3);
        assert_eq!(surface.rotation_count(), 3);
        // Three spins of 3s each plus two cooldown gaps of 500ms.
        assert!(result.duration_seconds >= 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_assets_count_as_degraded() {
        let surface = Arc::new(RecordingSurface::new());
        let controller = controller(RouletteConfig::default(), false, surface.clone());

        let result = controller
            .run(&RunOptions::new(2).with_preload(false))
            .await;

        assert_eq!(result.spins_completed, 2);
        assert_eq!(result.degraded_results, 2);
        assert!(surface.results().iter().all(|r| !r.has_real_image()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_before_run_stops_immediately() {
        let surface = Arc::new(RecordingSurface::new());
        let controller = controller(RouletteConfig::default(), true, surface.clone());
        controller.interrupt();

        let result = controller.run(&RunOptions::new(5)).await;

        assert_eq!(result.stop_reason, StopReason::UserInterrupt);
        assert_eq!(result.spins_completed, 0);
        assert_eq!(surface.rotation_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_flag_cancels_spin_in_flight() {
        let surface = Arc::new(RecordingSurface::new());
        let controller = Arc::new(controller(
            RouletteConfig::default(),
            true,
            surface.clone(),
        ));

        let runner = controller.clone();
        let task = tokio::spawn(async move { runner.run(&RunOptions::new(10)).await });
        tokio::time::sleep(Duration::from_millis(4000)).await;
        controller.interrupt();
        let result = task.await.unwrap();

        assert_eq!(result.stop_reason, StopReason::UserInterrupt);
        assert_eq!(result.spins_completed, 1);
        assert!(controller.interrupt_flag().load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_preload_stops_without_waiting() {
        let surface = Arc::new(RecordingSurface::new());
        let roulette = Roulette::with_loader(
            RouletteConfig::default(),
            PathBuf::from("images"),
            Arc::new(Stalled),
            surface.clone(),
            FeedbackChannel::silent(),
            Some(7),
        )
        .unwrap();
        let controller = Arc::new(SpinController::new(roulette));

        let runner = controller.clone();
        let task = tokio::spawn(async move { runner.run(&RunOptions::new(3)).await });
        tokio::time::sleep(Duration::from_millis(1000)).await;
        controller.interrupt();
        let result = task.await.unwrap();

        assert_eq!(result.stop_reason, StopReason::UserInterrupt);
        assert_eq!(result.spins_completed, 0);
        assert_eq!(surface.rotation_count(), 0);
        // Preload is bounded at 15s; the interrupt must not wait for it.
        assert!(result.duration_seconds < 2.0, "{}", result.duration_seconds);
    }

    #[tokio::test]
    async fn test_empty_catalog_stops_without_spinning() {
        let mut config = RouletteConfig::default();
        config.catalog.items.clear();
        let surface = Arc::new(RecordingSurface::new());
        let controller = controller(config, true, surface.clone());

        let result = controller.run(&RunOptions::new(1)).await;

        assert_eq!(result.stop_reason, StopReason::EmptyCatalog);
        assert_eq!(surface.rotation_count(), 0);
    }
}
