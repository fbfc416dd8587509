//! Periodic expiration sweeper.

use std::sync::{Arc, Weak};
use std::time::Duration;

use storyfeed_core::scheduler::{CancelToken, Scheduler};

use super::feed_service::StoryFeedService;

/// Re-checks story validity on a fixed interval while it is alive.
///
/// The timer holds only a weak reference to the feed, and stopping or
/// dropping the sweeper cancels the timer.
#[derive(Debug)]
pub struct ExpirationSweeper {
    token: CancelToken,
}

impl ExpirationSweeper {
    /// Starts sweeping `feed` every `interval`.
    #[must_use]
    pub fn start(
        feed: &Arc<StoryFeedService>,
        scheduler: &dyn Scheduler,
        interval: Duration,
    ) -> Self {
        let feed: Weak<StoryFeedService> = Arc::downgrade(feed);
        let token = scheduler.start(
            interval,
            Box::new(move || {
                if let Some(feed) = feed.upgrade() {
                    feed.sweep_expired();
                }
            }),
        );
        tracing::debug!(interval_secs = interval.as_secs(), "expiration sweeper started");
        Self { token }
    }

    /// Stops the timer. Idempotent.
    pub fn stop(&mut self) {
        if !self.token.is_cancelled() {
            tracing::debug!("expiration sweeper stopped");
        }
        self.token.cancel();
    }

    /// Returns `true` until stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }
}
