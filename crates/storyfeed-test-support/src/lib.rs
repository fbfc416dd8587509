//! Shared test mocks and utilities for the story feed.

mod clock;
mod fixtures;
mod media;
mod platform;
mod repository;
mod scheduler;

pub use clock::{FixedClock, ManualClock};
pub use fixtures::{StoryFixture, fixed_now};
pub use media::{FailingMediaUploader, RecordingMediaUploader};
pub use platform::RecordingShareSheet;
pub use repository::{FailingStoryRepository, RecordingStoryRepository};
pub use scheduler::ManualScheduler;

/// Yields to the runtime until spawned fire-and-forget tasks backed by
/// in-memory doubles have run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
