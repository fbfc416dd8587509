//! The story feed service.
//!
//! One instance per user session. It owns the in-memory working set, fetches
//! both story sources through the injected repository, and publishes every
//! change as a [`FeedSnapshot`] on a `watch` channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storyfeed_core::clock::Clock;
use storyfeed_core::error::DomainError;
use storyfeed_core::repository::StoryRepository;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::aggregation::{AggregatedStories, aggregate};
use crate::domain::sweep::sweep;
use crate::error::FeedError;

/// Load state of the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing fetched yet.
    Idle,
    /// The last refresh succeeded.
    Ready {
        /// When the working set was fetched.
        refreshed_at: DateTime<Utc>,
    },
    /// The last refresh failed. The working set is empty; a user-triggered
    /// refresh may succeed.
    Failed {
        /// Why the refresh failed.
        error: DomainError,
    },
}

/// What subscribers see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// The aggregated working set.
    pub stories: AggregatedStories,
    /// Load state.
    pub status: FeedStatus,
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self {
            stories: AggregatedStories::default(),
            status: FeedStatus::Idle,
        }
    }
}

/// Aggregates, holds and publishes the story working set.
pub struct StoryFeedService {
    user_id: Option<Uuid>,
    repo: Arc<dyn StoryRepository>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<FeedSnapshot>,
}

impl StoryFeedService {
    /// Creates a service for `user_id`. `None` means nobody is signed in;
    /// every refresh then fails with `DomainError::Unauthenticated`.
    #[must_use]
    pub fn new(
        user_id: Option<Uuid>,
        repo: Arc<dyn StoryRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(FeedSnapshot::default());
        Self {
            user_id,
            repo,
            clock,
            state,
        }
    }

    /// The signed-in user.
    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.state.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        self.state.borrow().clone()
    }

    /// Fetches both sources concurrently and replaces the working set.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::AggregationFailed` if there is no user or either
    /// fetch fails. The published snapshot is then empty with a `Failed`
    /// status; it never keeps stale stories next to an error.
    #[tracing::instrument(skip(self), fields(user_id = ?self.user_id))]
    pub async fn refresh(&self) -> Result<FeedSnapshot, FeedError> {
        match self.fetch().await {
            Ok(stories) => {
                let snapshot = FeedSnapshot {
                    stories,
                    status: FeedStatus::Ready {
                        refreshed_at: self.clock.now(),
                    },
                };
                tracing::info!(
                    stories = snapshot.stories.len(),
                    groups = snapshot.stories.groups.len(),
                    "story feed refreshed"
                );
                self.state.send_replace(snapshot.clone());
                Ok(snapshot)
            }
            Err(error) => {
                tracing::warn!(%error, "story feed refresh failed");
                self.state.send_replace(FeedSnapshot {
                    stories: AggregatedStories::default(),
                    status: FeedStatus::Failed {
                        error: error.clone(),
                    },
                });
                Err(FeedError::AggregationFailed(error))
            }
        }
    }

    async fn fetch(&self) -> Result<AggregatedStories, DomainError> {
        let user_id = self.user_id.ok_or(DomainError::Unauthenticated)?;
        let (followed, own) = tokio::join!(
            self.repo.fetch_followed_stories(user_id),
            self.repo.fetch_own_stories(user_id),
        );
        Ok(aggregate(followed?, own?, self.clock.now()))
    }

    /// Drops expired stories from the working set. Subscribers are notified
    /// only if something was removed. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;
        self.state.send_if_modified(|snapshot| {
            removed = sweep(&mut snapshot.stories, now);
            removed > 0
        });
        if removed > 0 {
            tracing::debug!(removed, "swept expired stories");
        }
        removed
    }

    /// Flags a story as viewed in the working set after the backend accepted
    /// the view. Returns `false` if the story is unknown or already viewed.
    pub fn mark_viewed_locally(&self, story_id: Uuid) -> bool {
        self.state.send_if_modified(|snapshot| {
            let mut changed = false;
            let working = &mut snapshot.stories;
            let flat = working.stories.iter_mut();
            let grouped = working.groups.iter_mut().flat_map(|g| g.stories.iter_mut());
            for story in flat.chain(grouped) {
                if story.id == story_id && !story.is_viewed {
                    story.is_viewed = true;
                    changed = true;
                }
            }
            changed
        })
    }

    /// Removes a story from the working set, e.g. after its owner deleted it.
    /// Returns `false` if it was not present.
    pub fn remove_locally(&self, story_id: Uuid) -> bool {
        self.state.send_if_modified(|snapshot| {
            let working = &mut snapshot.stories;
            let before = working.stories.len();
            working.stories.retain(|s| s.id != story_id);
            for group in &mut working.groups {
                group.stories.retain(|s| s.id != story_id);
            }
            working.groups.retain(|g| !g.stories.is_empty());
            working.stories.len() != before
        })
    }
}
