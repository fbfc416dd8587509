//! Shared helpers for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use storyfeed_core::clock::Clock;
use storyfeed_core::media::UploadProgress;
use storyfeed_feed::domain::bar::BarItem;
use storyfeed_runtime::config::StoryFeedConfig;
use storyfeed_runtime::session::{SessionServices, StorySession};
use storyfeed_test_support::{
    ManualClock, ManualScheduler, RecordingMediaUploader, RecordingShareSheet,
    RecordingStoryRepository, fixed_now,
};
use uuid::Uuid;

/// In-memory collaborators on a virtual timeline starting at `fixed_now()`.
pub struct Harness {
    pub user_id: Uuid,
    pub repo: Arc<RecordingStoryRepository>,
    pub clock: Arc<ManualClock>,
    pub scheduler: Arc<ManualScheduler>,
    pub uploader: Arc<RecordingMediaUploader>,
    pub share_sheet: Arc<RecordingShareSheet>,
}

impl Harness {
    pub fn new(user_id: Uuid, repo: RecordingStoryRepository) -> Self {
        Self {
            user_id,
            repo: Arc::new(repo),
            clock: Arc::new(ManualClock::new(fixed_now())),
            scheduler: Arc::new(ManualScheduler::new()),
            uploader: Arc::new(RecordingMediaUploader::new()),
            share_sheet: Arc::new(RecordingShareSheet::new(false)),
        }
    }

    pub fn services(&self) -> SessionServices {
        let clock: Arc<dyn Clock> = self.clock.clone();
        SessionServices {
            repo: self.repo.clone(),
            uploader: self.uploader.clone(),
            share_sheet: self.share_sheet.clone(),
            clock,
            scheduler: self.scheduler.clone(),
        }
    }

    pub fn session(&self, owned_products: &[Uuid]) -> StorySession {
        StorySession::start(
            Some(self.user_id),
            owned_products.iter().copied(),
            self.services(),
            StoryFeedConfig::default(),
        )
    }

    pub fn advance(&self, by: Duration) {
        self.scheduler.advance(&self.clock, by);
    }
}

/// Usernames of the seller tiles, in bar order.
pub fn tile_names(items: &[BarItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            BarItem::Seller(tile) => Some(tile.username.clone()),
            BarItem::Create => None,
        })
        .collect()
}

pub fn no_progress(_: UploadProgress) {}
