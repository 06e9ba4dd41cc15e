//! TUI application state and event handling.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use super::ui;
use crate::assets::AssetCache;
use crate::feedback::{FeedbackSink, Level, Notification};
use crate::render::{DisplayedResult, ResultImage};
use crate::surface::{RenderSurface, RenderSurfaceError};
use crate::wheel::{normalize_angle, select_index, IgnoreReason, SpinEngine, TriggerOutcome};

/// Events that can be sent to the TUI.
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// The wheel started turning towards `target_angle`.
    Spin {
        /// Final wheel angle in degrees.
        target_angle: f64,
        /// Animation length.
        duration: Duration,
    },
    /// A segment landed under the pointer.
    Highlight(usize),
    /// A result is ready to show.
    Result(DisplayedResult),
    /// A status notification.
    Notice(Notification),
    /// Readiness check from the surface; carries nothing.
    Probe,
    /// Quit the TUI.
    Quit,
}

/// Statistics tracked by the TUI.
#[derive(Debug, Clone, Default)]
pub struct TuiStats {
    /// Results shown so far.
    pub spins: u32,
    /// Results shown with a stand-in image.
    pub placeholders: u32,
    /// Warning notices received.
    pub warnings: u32,
    /// Error notices received.
    pub errors: u32,
}

/// TUI application state (separate from terminal for borrowing).
#[derive(Debug)]
pub struct TuiState {
    /// Segment labels in wheel order.
    pub labels: Vec<String>,
    /// Angle the current animation started from.
    pub angle_from: f64,
    /// Angle the current animation ends at.
    pub angle_to: f64,
    /// When the current animation started.
    pub spin_started: Option<Instant>,
    /// Length of the current animation.
    pub spin_duration: Duration,
    /// Segment marked as the winner.
    pub highlighted: Option<usize>,
    /// Last displayed result.
    pub result: Option<DisplayedResult>,
    /// Notification log.
    pub log: VecDeque<(Level, String)>,
    /// Maximum log lines to keep.
    pub max_log_lines: usize,
    /// Start time.
    pub start_time: Instant,
    /// Statistics.
    pub stats: TuiStats,
    /// Spinner frame index.
    pub spinner_frame: usize,
}

impl TuiState {
    /// Create state for a wheel with the given segment labels.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            angle_from: 0.0,
            angle_to: 0.0,
            spin_started: None,
            spin_duration: Duration::ZERO,
            highlighted: None,
            result: None,
            log: VecDeque::with_capacity(64),
            max_log_lines: 200,
            start_time: Instant::now(),
            stats: TuiStats::default(),
            spinner_frame: 0,
        }
    }

    /// Apply an event. Returns false if the TUI should quit.
    pub fn apply(&mut self, event: TuiEvent) -> bool {
        self.apply_at(event, Instant::now())
    }

    pub(crate) fn apply_at(&mut self, event: TuiEvent, now: Instant) -> bool {
        match event {
            TuiEvent::Spin {
                target_angle,
                duration,
            } => {
                self.angle_from = normalize_angle(self.angle_to);
                self.angle_to = target_angle;
                self.spin_started = Some(now);
                self.spin_duration = duration;
                self.highlighted = None;
            }
            TuiEvent::Highlight(index) => {
                self.highlighted = Some(index);
                // The engine has already normalized; snap the animation to rest.
                self.spin_started = None;
            }
            TuiEvent::Result(result) => {
                self.stats.spins += 1;
                if !matches!(result.image, ResultImage::Loaded(_)) {
                    self.stats.placeholders += 1;
                }
                self.result = Some(result);
            }
            TuiEvent::Notice(notification) => {
                match notification.level {
                    Level::Warning => self.stats.warnings += 1,
                    Level::Error => self.stats.errors += 1,
                    _ => {}
                }
                self.add_log(notification.level, notification.message);
            }
            TuiEvent::Probe => {}
            TuiEvent::Quit => return false,
        }
        true
    }

    /// Add a log line, respecting max buffer size.
    pub fn add_log(&mut self, level: Level, message: impl Into<String>) {
        self.log.push_back((level, message.into()));
        while self.log.len() > self.max_log_lines {
            self.log.pop_front();
        }
    }

    /// Wheel angle to draw at `now`.
    pub fn display_angle(&self, now: Instant) -> f64 {
        match self.spin_started {
            Some(started) if !self.spin_duration.is_zero() => {
                let t = now.saturating_duration_since(started).as_secs_f64()
                    / self.spin_duration.as_secs_f64();
                self.angle_from + (self.angle_to - self.angle_from) * ease_out(t.min(1.0))
            }
            _ => self.angle_to,
        }
    }

    /// Whether the wheel is still turning at `now`.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.spin_started
            .is_some_and(|started| now.saturating_duration_since(started) < self.spin_duration)
    }

    /// Segment currently under the pointer.
    pub fn pointer_index(&self, now: Instant) -> Option<usize> {
        select_index(self.display_angle(now), self.labels.len()).ok()
    }

    /// Get elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

/// Cubic ease-out: fast start, slow stop.
fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn describe_ignored(reason: IgnoreReason) -> String {
    match reason {
        IgnoreReason::Spinning => "Still spinning...".to_string(),
        IgnoreReason::Cooldown { remaining } => {
            format!("Easy there! Ready in {} ms", remaining.as_millis())
        }
        IgnoreReason::EmptyCatalog => "There is nothing on the wheel".to_string(),
        IgnoreReason::ShutDown => "The wheel has stopped for good".to_string(),
    }
}

/// Render surface that forwards to the TUI event loop.
#[derive(Debug, Clone)]
pub struct TuiSurface {
    tx: Sender<TuiEvent>,
}

impl TuiSurface {
    /// Create a surface sending to `tx`.
    pub fn new(tx: Sender<TuiEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: TuiEvent) -> Result<(), RenderSurfaceError> {
        self.tx
            .send(event)
            .map_err(|_| RenderSurfaceError::MissingElement("tui event loop".into()))
    }
}

impl RenderSurface for TuiSurface {
    fn check_ready(&self) -> Result<(), RenderSurfaceError> {
        self.send(TuiEvent::Probe)
    }

    fn apply_rotation(
        &self,
        target_angle: f64,
        duration: Duration,
    ) -> Result<(), RenderSurfaceError> {
        self.send(TuiEvent::Spin {
            target_angle,
            duration,
        })
    }

    fn highlight_segment(&self, index: usize) -> Result<(), RenderSurfaceError> {
        self.send(TuiEvent::Highlight(index))
    }

    fn show_result(&self, result: &DisplayedResult) -> Result<(), RenderSurfaceError> {
        self.send(TuiEvent::Result(result.clone()))
    }
}

/// Feedback sink that writes into the TUI log.
#[derive(Debug, Clone)]
pub struct TuiFeedback {
    tx: Sender<TuiEvent>,
}

impl TuiFeedback {
    /// Create a sink sending to `tx`.
    pub fn new(tx: Sender<TuiEvent>) -> Self {
        Self { tx }
    }
}

impl FeedbackSink for TuiFeedback {
    fn notify(&self, notification: &Notification) {
        let _ = self.tx.send(TuiEvent::Notice(notification.clone()));
    }
}

/// TUI application.
pub struct TuiApp {
    /// Terminal instance.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Event receiver.
    rx: Receiver<TuiEvent>,
    /// Event sender (cloneable for external use).
    tx: Sender<TuiEvent>,
    /// Application state.
    state: TuiState,
    /// Last tick time.
    last_tick: Instant,
}

impl TuiApp {
    /// Create a new TUI application for a wheel with `labels`.
    pub fn new(labels: Vec<String>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let (tx, rx) = mpsc::channel();

        Ok(Self {
            terminal,
            rx,
            tx,
            state: TuiState::new(labels),
            last_tick: Instant::now(),
        })
    }

    /// Get a sender for sending events to the TUI.
    pub fn sender(&self) -> Sender<TuiEvent> {
        self.tx.clone()
    }

    /// Run the TUI event loop until the user quits.
    ///
    /// Must be called from a thread inside the tokio runtime so the engine
    /// can spawn spin tasks.
    pub fn run(&mut self, engine: &Arc<SpinEngine>, cache: &AssetCache) -> io::Result<()> {
        let tick_rate = Duration::from_millis(100);

        loop {
            let state = &self.state;
            let now = Instant::now();
            self.terminal.draw(|f| ui::draw(f, state, now))?;

            let timeout = tick_rate.saturating_sub(self.last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                            && key.code == KeyCode::Char('c');
                        match key.code {
                            _ if ctrl_c => break,
                            KeyCode::Char('q') | KeyCode::Esc => break,
                            KeyCode::Char(' ') | KeyCode::Enter => {
                                if let TriggerOutcome::Ignored(reason) = engine.trigger() {
                                    self.state.add_log(Level::Info, describe_ignored(reason));
                                }
                            }
                            KeyCode::Char('r') => {
                                let reset = cache.retry_failed();
                                self.state.add_log(
                                    Level::Info,
                                    format!("Retrying {reset} failed images on next draw"),
                                );
                            }
                            _ => {}
                        }
                    }
                }
            }

            let mut quit = false;
            while let Ok(event) = self.rx.try_recv() {
                if !self.state.apply(event) {
                    quit = true;
                    break;
                }
            }
            if quit {
                break;
            }

            if self.last_tick.elapsed() >= tick_rate {
                self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
                self.last_tick = Instant::now();
            }
        }

        engine.shutdown();
        Ok(())
    }

    /// Clean up and restore terminal.
    pub fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
