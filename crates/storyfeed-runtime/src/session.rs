//! One signed-in user's story session.
//!
//! Owns the feed service, the mounted story bar, at most one open viewer and
//! the creation wizard, and keeps them consistent: a confirmed view flips
//! the story's ring in the bar, a publish refreshes the bar, and a delete
//! removes the story locally.

use std::sync::{Arc, Weak};

use storyfeed_composer::application::command_handlers::handle_delete_story;
use storyfeed_composer::application::composer::StoryComposer;
use storyfeed_composer::domain::commands::DeleteStory;
use storyfeed_composer::error::ComposerError;
use storyfeed_core::clock::Clock;
use storyfeed_core::error::DomainError;
use storyfeed_core::media::{MediaUploader, ProgressFn};
use storyfeed_core::platform::ShareSheet;
use storyfeed_core::repository::StoryRepository;
use storyfeed_core::scheduler::Scheduler;
use storyfeed_core::story::Story;
use storyfeed_feed::application::bar_presenter::{BarAction, BarView, StoryBarPresenter};
use storyfeed_feed::application::feed_service::StoryFeedService;
use storyfeed_feed::domain::bar::ViewerLaunch;
use storyfeed_viewer::application::viewer::{StoryViewer, ViewedObserver, ViewerContext};
use uuid::Uuid;

use crate::config::StoryFeedConfig;

/// External collaborators shared by every component of a session.
#[derive(Clone)]
pub struct SessionServices {
    /// Story backend.
    pub repo: Arc<dyn StoryRepository>,
    /// Media storage.
    pub uploader: Arc<dyn MediaUploader>,
    /// Native share and clipboard.
    pub share_sheet: Arc<dyn ShareSheet>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Timer source.
    pub scheduler: Arc<dyn Scheduler>,
}

/// A mounted story bar with its viewer and composer.
pub struct StorySession {
    user_id: Option<Uuid>,
    services: SessionServices,
    config: StoryFeedConfig,
    feed: Arc<StoryFeedService>,
    bar: StoryBarPresenter,
    composer: StoryComposer,
    viewer: Option<StoryViewer>,
}

impl StorySession {
    /// Mounts the bar for `user_id` and starts the expiration sweep. Nothing
    /// is fetched until [`StorySession::load`].
    #[must_use]
    pub fn start(
        user_id: Option<Uuid>,
        owned_products: impl IntoIterator<Item = Uuid>,
        services: SessionServices,
        config: StoryFeedConfig,
    ) -> Self {
        let feed = Arc::new(StoryFeedService::new(
            user_id,
            Arc::clone(&services.repo),
            Arc::clone(&services.clock),
        ));
        let bar = StoryBarPresenter::mount(
            Arc::clone(&feed),
            Arc::clone(&services.clock),
            services.scheduler.as_ref(),
            &config.feed,
        );
        let composer = StoryComposer::new(
            user_id,
            owned_products,
            Arc::clone(&services.repo),
            Arc::clone(&services.uploader),
            config.composer.clone(),
        );
        tracing::info!(user_id = ?user_id, "story session started");
        Self {
            user_id,
            services,
            config,
            feed,
            bar,
            composer,
            viewer: None,
        }
    }

    /// The feed service, for subscribing to working-set changes.
    #[must_use]
    pub fn feed(&self) -> &Arc<StoryFeedService> {
        &self.feed
    }

    /// Fetches stories and renders the bar.
    pub async fn load(&self) -> BarView {
        self.bar.load().await
    }

    /// Re-fetches after a failed load.
    pub async fn retry(&self) -> BarView {
        self.bar.retry().await
    }

    /// Renders the bar from the current working set.
    #[must_use]
    pub fn bar(&self) -> BarView {
        self.bar.view()
    }

    /// Handles a tap on the bar item at `index`. Opening a seller replaces
    /// any viewer already open; the create button resets the wizard.
    ///
    /// Returns `None` for an index with no item, and for a seller tile when
    /// nobody is signed in, since views cannot be recorded without a user.
    pub fn activate(&mut self, index: usize) -> Option<BarAction> {
        let action = self.bar.activate(index)?;
        match &action {
            BarAction::Compose => self.composer.cancel(),
            BarAction::View(launch) => self.open_viewer(launch.clone())?,
        }
        Some(action)
    }

    fn open_viewer(&mut self, launch: ViewerLaunch) -> Option<()> {
        let Some(user_id) = self.user_id else {
            tracing::debug!(
                start_index = launch.start_index,
                "viewer not opened without a signed-in user"
            );
            return None;
        };
        self.close_viewer();
        let feed: Weak<StoryFeedService> = Arc::downgrade(&self.feed);
        let on_viewed: ViewedObserver = Arc::new(move |story_id| {
            if let Some(feed) = feed.upgrade() {
                feed.mark_viewed_locally(story_id);
            }
        });
        let ctx = ViewerContext {
            user_id,
            repo: Arc::clone(&self.services.repo),
            clock: Arc::clone(&self.services.clock),
            scheduler: Arc::clone(&self.services.scheduler),
            share_sheet: Arc::clone(&self.services.share_sheet),
            config: self.config.viewer.clone(),
            on_viewed: Some(on_viewed),
        };
        self.viewer = Some(StoryViewer::open(ctx, launch.stories, launch.start_index));
        Some(())
    }

    /// The viewer, while one is open.
    #[must_use]
    pub fn viewer(&self) -> Option<&StoryViewer> {
        self.viewer.as_ref().filter(|viewer| viewer.is_open())
    }

    /// Closes and drops the viewer.
    pub fn close_viewer(&mut self) {
        if let Some(viewer) = self.viewer.take() {
            viewer.close();
        }
    }

    /// The creation wizard.
    pub fn composer(&mut self) -> &mut StoryComposer {
        &mut self.composer
    }

    /// Publishes the composer's draft, then refreshes the bar so the new
    /// story shows up. A failed refresh leaves the bar in its error state
    /// but does not fail the publish.
    ///
    /// # Errors
    ///
    /// Returns the composer's error; the draft is kept for a retry.
    pub async fn publish(&mut self, on_progress: &ProgressFn) -> Result<Story, ComposerError> {
        let story = self.composer.publish(on_progress).await?;
        if let Err(error) = self.feed.refresh().await {
            tracing::warn!(%error, story_id = %story.id, "bar not refreshed after publish");
        }
        Ok(story)
    }

    /// Deletes one of the user's stories and drops it from the bar.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthenticated` without a user, otherwise the
    /// repository's error. The bar is unchanged on failure.
    pub async fn delete_story(&self, story_id: Uuid) -> Result<(), DomainError> {
        let user_id = self.user_id.ok_or(DomainError::Unauthenticated)?;
        let command = DeleteStory {
            correlation_id: Uuid::new_v4(),
            user_id,
            story_id,
        };
        handle_delete_story(&command, self.services.repo.as_ref()).await?;
        self.feed.remove_locally(story_id);
        Ok(())
    }

    /// Closes the viewer and stops every timer.
    pub fn end(&mut self) {
        self.close_viewer();
        self.bar.unmount();
        tracing::info!(user_id = ?self.user_id, "story session ended");
    }
}
