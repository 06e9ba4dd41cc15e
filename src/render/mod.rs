//! Resolving and showing the winning item.
//!
//! The renderer is the one place with a fallback pipeline: cached asset,
//! then retried loads with linear backoff, then a synthesized placeholder,
//! then plain text.

use std::sync::Arc;
use std::time::Duration;

use crate::assets::{synthesize_placeholder, AssetCache, AssetHandle, LoadError};
use crate::catalog::{Item, ItemId};
use crate::feedback::FeedbackChannel;
use crate::surface::{RenderSurface, RenderSurfaceError};

/// The image part of a displayed result.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultImage {
    /// The item's real asset.
    Loaded(AssetHandle),
    /// A generated stand-in.
    Placeholder(AssetHandle),
    /// No image at all.
    TextOnly,
}

/// What the surface is asked to show for a winner.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedResult {
    /// Winning item.
    pub item_id: ItemId,
    /// The item's label.
    pub label: String,
    /// The item's asset reference.
    pub asset_ref: String,
    /// Image to show.
    pub image: ResultImage,
}

impl DisplayedResult {
    /// Text shown next to (or instead of) the image.
    pub fn caption(&self) -> String {
        match self.image {
            ResultImage::TextOnly => format!("{} (Image not available)", self.label),
            _ => self.label.clone(),
        }
    }

    /// Whether the real asset is shown.
    pub fn has_real_image(&self) -> bool {
        matches!(self.image, ResultImage::Loaded(_))
    }
}

/// Retry schedule for failed loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay, multiplied by the retry number.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(1000),
        }
    }
}

/// Result of one render call.
#[derive(Debug)]
pub struct RenderOutcome {
    /// What was (or was meant to be) shown.
    pub displayed: DisplayedResult,
    /// Load attempts made, including the first.
    pub load_attempts: u32,
    /// Set when the surface refused the result.
    pub surface_error: Option<RenderSurfaceError>,
}

impl RenderOutcome {
    /// Whether the result reached the surface.
    pub fn is_shown(&self) -> bool {
        self.surface_error.is_none()
    }
}

/// Resolves a winner's asset and shows it.
pub struct ResultRenderer {
    cache: AssetCache,
    surface: Arc<dyn RenderSurface>,
    feedback: FeedbackChannel,
    policy: RetryPolicy,
}

impl ResultRenderer {
    /// Create a renderer.
    pub fn new(
        cache: AssetCache,
        surface: Arc<dyn RenderSurface>,
        feedback: FeedbackChannel,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            surface,
            feedback,
            policy,
        }
    }

    /// The cache this renderer reads from.
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Resolve `item`'s image and show it on the surface.
    pub async fn render(&self, item: &Item) -> RenderOutcome {
        self.feedback.progress(format!("Loading image for {}...", item.label));

        let (image, load_attempts) = match self.load_with_retry(item).await {
            (Ok(handle), attempts) => (ResultImage::Loaded(handle), attempts),
            (Err(e), attempts) => {
                tracing::warn!(item = item.id, attempts, error = %e, "all loads failed");
                (self.fallback_image(item), attempts)
            }
        };

        let displayed = DisplayedResult {
            item_id: item.id,
            label: item.label.clone(),
            asset_ref: item.asset_ref.clone(),
            image,
        };

        let surface_error = match self.surface.show_result(&displayed) {
            Ok(()) => {
                self.announce(&displayed);
                None
            }
            Err(e) => {
                tracing::error!(item = item.id, error = %e, "failed to show result");
                self.feedback
                    .error(format!("Could not display {}: {}", item.label, e));
                Some(e)
            }
        };

        RenderOutcome {
            displayed,
            load_attempts,
            surface_error,
        }
    }

    async fn load_with_retry(&self, item: &Item) -> (Result<AssetHandle, LoadError>, u32) {
        let mut attempts = 1;
        let mut result = self.cache.ensure_loaded(item).await;

        for retry in 1..=self.policy.max_retries {
            let Err(e) = &result else { break };
            let delay = self.policy.delay_for(retry);
            tracing::info!(item = item.id, retry, ?delay, error = %e, "retrying asset load");
            self.feedback.progress(format!(
                "Retrying image for {} ({}/{})",
                item.label, retry, self.policy.max_retries
            ));

            tokio::time::sleep(delay).await;
            self.cache.invalidate(item.id);
            attempts += 1;
            result = self.cache.ensure_loaded(item).await;
        }

        (result, attempts)
    }

    fn fallback_image(&self, item: &Item) -> ResultImage {
        match synthesize_placeholder(item) {
            Ok(handle) => ResultImage::Placeholder(handle),
            Err(e) => {
                tracing::error!(item = item.id, error = %e, "placeholder synthesis failed");
                ResultImage::TextOnly
            }
        }
    }

    fn announce(&self, displayed: &DisplayedResult) {
        match displayed.image {
            ResultImage::Loaded(_) => {
                self.feedback
                    .success(format!("You got: {}", displayed.caption()));
            }
            ResultImage::Placeholder(_) | ResultImage::TextOnly => {
                self.feedback.warning(format!(
                    "You got: {} (showing a placeholder, {} could not be loaded)",
                    displayed.caption(),
                    displayed.asset_ref
                ));
            }
        }
    }
}

impl std::fmt::Debug for ResultRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultRenderer")
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
