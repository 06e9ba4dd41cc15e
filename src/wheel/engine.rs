//! Spin state machine.
//!
//! `Idle --trigger--> Spinning --completion--> Idle`. At most one spin is in
//! flight, and a spin only completes once its result has been rendered.
//! Completion runs on a spawned task that races the spin timer against the
//! engine's shutdown signal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::randomizer::{
    fallback_index, fallback_rotation, generate_rotation, normalize_angle, select_index,
    RandomSource, FALLBACK_ROTATION_MIN,
};
use super::{EngineState, SpinSession, WheelSettings};
use crate::catalog::{Item, ItemCatalog};
use crate::feedback::FeedbackChannel;
use crate::render::{RenderOutcome, ResultRenderer};
use crate::surface::RenderSurface;

/// Why a trigger did not start a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A spin is already in flight.
    Spinning,
    /// The previous spin was too recent.
    Cooldown {
        /// Time until the next trigger is accepted.
        remaining: Duration,
    },
    /// There is nothing to select.
    EmptyCatalog,
    /// The engine was shut down.
    ShutDown,
}

/// Result of [`SpinEngine::trigger`].
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A spin started.
    Started(SpinHandle),
    /// The trigger was a no-op.
    Ignored(IgnoreReason),
}

impl TriggerOutcome {
    /// The handle, if a spin started.
    pub fn started(self) -> Option<SpinHandle> {
        match self {
            TriggerOutcome::Started(handle) => Some(handle),
            TriggerOutcome::Ignored(_) => None,
        }
    }

    /// The reason, if the trigger was ignored.
    pub fn ignored(&self) -> Option<IgnoreReason> {
        match self {
            TriggerOutcome::Started(_) => None,
            TriggerOutcome::Ignored(reason) => Some(*reason),
        }
    }
}

/// A completed spin.
#[derive(Debug)]
pub struct SpinReport {
    /// The session that completed.
    pub session: SpinSession,
    /// The winning item.
    pub item: Item,
    /// How the result was rendered.
    pub render: RenderOutcome,
}

/// How a spin ended.
#[derive(Debug)]
pub enum SpinOutcome {
    /// The wheel stopped and a result was rendered.
    Completed(Box<SpinReport>),
    /// Shutdown interrupted the spin before it landed.
    Cancelled,
}

impl SpinOutcome {
    /// The report, if the spin completed.
    pub fn report(&self) -> Option<&SpinReport> {
        match self {
            SpinOutcome::Completed(report) => Some(report),
            SpinOutcome::Cancelled => None,
        }
    }

    /// Whether shutdown interrupted the spin.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SpinOutcome::Cancelled)
    }
}

/// Handle to a running spin.
#[derive(Debug)]
pub struct SpinHandle {
    session: SpinSession,
    task: JoinHandle<SpinOutcome>,
}

impl SpinHandle {
    /// The session planned at trigger time.
    pub fn session(&self) -> &SpinSession {
        &self.session
    }

    /// Wait until the spin completes or is cancelled.
    pub async fn wait(self) -> SpinOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "spin task did not finish");
                SpinOutcome::Cancelled
            }
        }
    }
}

struct EngineCore {
    state: EngineState,
    current_angle: f64,
    session: Option<SpinSession>,
    last_trigger: Option<Instant>,
    last_completion: Option<Instant>,
    spins_completed: u64,
    shut_down: bool,
}

/// Owns the wheel state and runs spins.
pub struct SpinEngine {
    catalog: Arc<ItemCatalog>,
    surface: Arc<dyn RenderSurface>,
    renderer: ResultRenderer,
    feedback: FeedbackChannel,
    settings: WheelSettings,
    rng: Mutex<Box<dyn RandomSource>>,
    core: Mutex<EngineCore>,
    shutdown_tx: watch::Sender<bool>,
}

impl SpinEngine {
    /// Create an idle engine at angle 0.
    pub fn new(
        catalog: Arc<ItemCatalog>,
        surface: Arc<dyn RenderSurface>,
        renderer: ResultRenderer,
        feedback: FeedbackChannel,
        settings: WheelSettings,
        rng: Box<dyn RandomSource>,
    ) -> Arc<Self> {
        if !catalog.is_fairly_distributed() {
            tracing::warn!("catalog weights differ; selection stays uniform per segment");
        }
        let (shutdown_tx, _) = watch::channel(false);

        Arc::new(Self {
            catalog,
            surface,
            renderer,
            feedback,
            settings,
            rng: Mutex::new(rng),
            core: Mutex::new(EngineCore {
                state: EngineState::Idle,
                current_angle: 0.0,
                session: None,
                last_trigger: None,
                last_completion: None,
                spins_completed: 0,
                shut_down: false,
            }),
            shutdown_tx,
        })
    }

    fn core(&self) -> MutexGuard<'_, EngineCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    pub fn state(&self) -> EngineState {
        self.core().state
    }

    /// Resting angle of the wheel, in `[0, 360)`.
    pub fn current_angle(&self) -> f64 {
        self.core().current_angle
    }

    /// The in-flight session, if any.
    pub fn session(&self) -> Option<SpinSession> {
        self.core().session.clone()
    }

    /// Number of spins that reached completion.
    pub fn spins_completed(&self) -> u64 {
        self.core().spins_completed
    }

    /// The catalog the wheel is built from.
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// The renderer used for results.
    pub fn renderer(&self) -> &ResultRenderer {
        &self.renderer
    }

    /// Engine timing settings.
    pub fn settings(&self) -> WheelSettings {
        self.settings
    }

    /// Time left before a trigger would be accepted, if any.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        cooldown_left(&self.core(), self.settings.cooldown, Instant::now())
    }

    /// Try to start a spin.
    pub fn trigger(self: &Arc<Self>) -> TriggerOutcome {
        let now = Instant::now();
        let session = {
            let mut core = self.core();
            if core.shut_down {
                return TriggerOutcome::Ignored(IgnoreReason::ShutDown);
            }
            if core.state == EngineState::Spinning {
                tracing::debug!("trigger ignored: already spinning");
                return TriggerOutcome::Ignored(IgnoreReason::Spinning);
            }
            if self.catalog.is_empty() {
                return TriggerOutcome::Ignored(IgnoreReason::EmptyCatalog);
            }
            if let Some(remaining) = cooldown_left(&core, self.settings.cooldown, now) {
                tracing::debug!(?remaining, "trigger ignored: cooling down");
                return TriggerOutcome::Ignored(IgnoreReason::Cooldown { remaining });
            }

            let session = self.plan_spin(core.current_angle);
            core.state = EngineState::Spinning;
            core.session = Some(session.clone());
            core.last_trigger = Some(now);
            session
        };

        tracing::info!(
            start = session.start_angle,
            target = session.final_angle,
            index = session.selected_index,
            item = session.selected_item_id,
            "spin started"
        );

        let duration = self.settings.spin_duration;
        if let Err(e) = self.surface.apply_rotation(session.final_angle, duration) {
            // The timer still runs so the engine always returns to Idle.
            tracing::warn!(error = %e, "surface could not animate rotation");
        }
        self.feedback.progress("The wheel is spinning!");

        let engine = Arc::clone(self);
        let shutdown = self.shutdown_tx.subscribe();
        let planned = session.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => engine.complete(planned).await,
                _ = wait_for_shutdown(shutdown) => engine.cancel(),
            }
        });

        TriggerOutcome::Started(SpinHandle { session, task })
    }

    /// Resolves once [`shutdown`](Self::shutdown) has been called.
    pub async fn stopped(&self) {
        wait_for_shutdown(self.shutdown_tx.subscribe()).await;
    }

    /// Stop accepting triggers and cancel any spin in flight.
    pub fn shutdown(&self) {
        {
            let mut core = self.core();
            if core.shut_down {
                return;
            }
            core.shut_down = true;
        }
        tracing::info!("spin engine shutting down");
        self.shutdown_tx.send_replace(true);
    }

    fn plan_spin(&self, start_angle: f64) -> SpinSession {
        let mut guard = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let rng: &mut dyn RandomSource = &mut **guard;
        let count = self.catalog.len();
        let mut fallback_used = false;

        let delta_angle = match generate_rotation(
            rng,
            self.settings.min_rotations,
            self.settings.max_rotations,
        ) {
            Ok(rotation) => rotation,
            Err(e) => {
                tracing::warn!(error = %e, "using fallback rotation");
                fallback_used = true;
                fallback_rotation(rng).unwrap_or(FALLBACK_ROTATION_MIN)
            }
        };
        let final_angle = start_angle + delta_angle;

        let selected_index = match select_index(final_angle, count) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!(error = %e, "using fallback index");
                fallback_used = true;
                fallback_index(rng, count).unwrap_or(0)
            }
        };
        let selected_item_id = self
            .catalog
            .get(selected_index)
            .map(|item| item.id)
            .unwrap_or_default();

        SpinSession {
            start_angle,
            delta_angle,
            final_angle,
            selected_item_id,
            selected_index,
            started_at: Utc::now(),
            fallback_used,
        }
    }

    async fn complete(&self, session: SpinSession) -> SpinOutcome {
        // The wheel rests here from now on, but the engine stays busy until
        // the result is on screen.
        self.core().current_angle = normalize_angle(session.final_angle);

        let outcome = match self.catalog.get(session.selected_index).cloned() {
            Some(item) => {
                tracing::info!(item = item.id, label = %item.label, "spin landed");
                if let Err(e) = self.surface.highlight_segment(session.selected_index) {
                    tracing::warn!(error = %e, "surface could not highlight segment");
                }
                let render = self.renderer.render(&item).await;
                SpinOutcome::Completed(Box::new(SpinReport {
                    session,
                    item,
                    render,
                }))
            }
            None => {
                // The catalog is immutable, so a planned index is always valid.
                tracing::error!(index = session.selected_index, "planned segment vanished");
                SpinOutcome::Cancelled
            }
        };

        let mut core = self.core();
        core.state = EngineState::Idle;
        core.session = None;
        core.last_completion = Some(Instant::now());
        if outcome.report().is_some() {
            core.spins_completed += 1;
        }
        outcome
    }

    fn cancel(&self) -> SpinOutcome {
        let mut core = self.core();
        core.state = EngineState::Idle;
        core.session = None;
        tracing::info!("spin cancelled");
        SpinOutcome::Cancelled
    }
}

impl std::fmt::Debug for SpinEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.core();
        f.debug_struct("SpinEngine")
            .field("state", &core.state)
            .field("current_angle", &core.current_angle)
            .field("items", &self.catalog.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Cooldown counts from the later of the last trigger and the last completion.
fn cooldown_left(core: &EngineCore, cooldown: Duration, now: Instant) -> Option<Duration> {
    let since = match (core.last_trigger, core.last_completion) {
        (Some(a), Some(b)) => a.max(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let remaining = cooldown.saturating_sub(now.saturating_duration_since(since));
    (!remaining.is_zero()).then_some(remaining)
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    // Also resolves if shutdown happened before this receiver subscribed.
    let _ = rx.wait_for(|stopped| *stopped).await;
}
