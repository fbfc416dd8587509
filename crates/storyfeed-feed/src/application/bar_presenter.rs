//! Story bar presenter.
//!
//! Turns the feed's working set into bar items and maps taps to actions. A
//! mounted presenter owns the expiration sweeper; unmounting or dropping it
//! stops the sweep.

use std::sync::Arc;

use storyfeed_core::clock::Clock;
use storyfeed_core::error::DomainError;
use storyfeed_core::scheduler::Scheduler;

use super::feed_service::{FeedStatus, StoryFeedService};
use super::sweeper::ExpirationSweeper;
use crate::config::FeedConfig;
use crate::domain::bar::{BarItem, ViewerLaunch, bar_items, launch_for};

/// Error banner shown above an empty bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarError {
    /// Reason from the failed refresh.
    pub message: String,
    /// Whether to show a retry affordance.
    pub retryable: bool,
    /// The typed failure, so a signed-out user can be sent to sign in
    /// instead of shown a network error.
    pub cause: DomainError,
}

/// Everything the bar renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarView {
    /// Items in display order. Always starts with `BarItem::Create`.
    pub items: Vec<BarItem>,
    /// Set when the last refresh failed.
    pub error: Option<BarError>,
    /// `true` until the first refresh completes.
    pub loading: bool,
}

/// Result of tapping a bar item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BarAction {
    /// Open the story composer.
    Compose,
    /// Open the viewer.
    View(ViewerLaunch),
}

/// Presents the feed as a story bar for the lifetime of one mount.
pub struct StoryBarPresenter {
    feed: Arc<StoryFeedService>,
    clock: Arc<dyn Clock>,
    sweeper: ExpirationSweeper,
}

impl StoryBarPresenter {
    /// Mounts the bar and starts sweeping.
    #[must_use]
    pub fn mount(
        feed: Arc<StoryFeedService>,
        clock: Arc<dyn Clock>,
        scheduler: &dyn Scheduler,
        config: &FeedConfig,
    ) -> Self {
        let sweeper = ExpirationSweeper::start(&feed, scheduler, config.sweep_interval());
        Self {
            feed,
            clock,
            sweeper,
        }
    }

    /// Fetches stories and returns the resulting view. A failed fetch
    /// yields an empty bar with an error banner rather than an error.
    pub async fn load(&self) -> BarView {
        if let Err(error) = self.feed.refresh().await {
            tracing::warn!(%error, "story bar showing empty state");
        }
        self.view()
    }

    /// User-triggered retry after a failed load.
    pub async fn retry(&self) -> BarView {
        self.load().await
    }

    /// Renders the current working set.
    #[must_use]
    pub fn view(&self) -> BarView {
        let snapshot = self.feed.snapshot();
        let error = match &snapshot.status {
            FeedStatus::Failed { error } => Some(BarError {
                message: error.to_string(),
                retryable: true,
                cause: error.clone(),
            }),
            FeedStatus::Idle | FeedStatus::Ready { .. } => None,
        };
        BarView {
            items: bar_items(&snapshot.stories.groups, self.clock.now()),
            error,
            loading: snapshot.status == FeedStatus::Idle,
        }
    }

    /// Maps a tap on the item at `index` of the current view.
    #[must_use]
    pub fn activate(&self, index: usize) -> Option<BarAction> {
        let snapshot = self.feed.snapshot();
        let items = bar_items(&snapshot.stories.groups, self.clock.now());
        match items.get(index)? {
            BarItem::Create => Some(BarAction::Compose),
            BarItem::Seller(tile) => {
                launch_for(&snapshot.stories.groups, &tile.key).map(BarAction::View)
            }
        }
    }

    /// Returns `true` while the sweeper runs.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.sweeper.is_running()
    }

    /// Stops the sweeper.
    pub fn unmount(&mut self) {
        self.sweeper.stop();
    }
}
