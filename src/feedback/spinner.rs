//! Inline spinner shown while the wheel is turning.
//!
//! The spinner runs in a background thread and redraws a single terminal
//! line with an animated frame, the current message and the time left in
//! the spin.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::art::get_spinner_frame;

/// Redraw interval for the spinner line.
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// An inline spinner for the duration of a spin animation.
///
/// # Example
///
/// ```ignore
/// let spinner = Spinner::start("Spinning...", Duration::from_secs(3));
/// // ... wheel turns ...
/// spinner.stop_with_success("Landed on segment 3");
/// ```
pub struct Spinner {
    running: Arc<AtomicBool>,
    message: Arc<Mutex<String>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start a spinner that counts down `expected` alongside the message.
    pub fn start(message: &str, expected: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let message = Arc::new(Mutex::new(message.to_string()));
        let running_clone = running.clone();
        let message_clone = message.clone();

        let handle = thread::spawn(move || {
            let started = Instant::now();
            let mut frame = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let remaining = expected.saturating_sub(started.elapsed());
                let text = message_clone
                    .lock()
                    .map(|m| m.clone())
                    .unwrap_or_default();
                print!(
                    "\r\x1b[2K\x1b[35m{}\x1b[0m \x1b[2m{}\x1b[0m \x1b[36m{:.1}s\x1b[0m",
                    get_spinner_frame("wheel", frame),
                    text,
                    remaining.as_secs_f64()
                );
                let _ = io::stdout().flush();

                frame = frame.wrapping_add(1);
                thread::sleep(FRAME_INTERVAL);
            }
        });

        Self {
            running,
            message,
            handle: Some(handle),
        }
    }

    /// Replace the message shown next to the spinner.
    pub fn set_message(&self, message: &str) {
        if let Ok(mut current) = self.message.lock() {
            *current = message.to_string();
        }
    }

    /// Stop the spinner and clear the line.
    pub fn stop(mut self) {
        self.halt();
    }

    /// Stop the spinner and replace it with a success message.
    pub fn stop_with_success(mut self, message: &str) {
        self.halt();
        println!("\x1b[32m✓\x1b[0m {}", message);
    }

    /// Stop the spinner and replace it with an error message.
    pub fn stop_with_error(mut self, message: &str) {
        self.halt();
        println!("\x1b[31m✗\x1b[0m {}", message);
    }

    fn halt(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            print!("\r\x1b[2K");
            let _ = io::stdout().flush();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.halt();
    }
}
