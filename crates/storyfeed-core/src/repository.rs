//! Story storage collaborator.
//!
//! Persistence, querying and counter maintenance live behind
//! [`StoryRepository`]. The story contexts only read, filter and dispatch
//! mutations; they never assume the backend purges expired rows on time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::story::{Interaction, Story, StoryContent};

/// Payload for creating a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    /// Product the story attaches to. Must be owned by the creator.
    pub product_id: Uuid,
    /// Slide content, with uploaded media already referenced by URL.
    pub content: StoryContent,
    /// Playback duration in seconds.
    pub duration_secs: u32,
    /// Optional caption.
    pub caption: Option<String>,
}

/// Repository trait for reading stories and recording engagement.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Load stories published by sellers that `user_id` follows.
    async fn fetch_followed_stories(&self, user_id: Uuid) -> Result<Vec<Story>, DomainError>;

    /// Load stories published by `user_id`.
    async fn fetch_own_stories(&self, user_id: Uuid) -> Result<Vec<Story>, DomainError>;

    /// Create a story on behalf of `user_id`.
    ///
    /// Fails with `DomainError::Ownership` if the user does not own
    /// `new_story.product_id`.
    async fn create_story(
        &self,
        user_id: Uuid,
        new_story: NewStory,
    ) -> Result<Story, DomainError>;

    /// Record that `user_id` viewed the story. Idempotent from the caller's
    /// point of view; the backend may count duplicates.
    async fn mark_viewed(&self, story_id: Uuid, user_id: Uuid) -> Result<(), DomainError>;

    /// Record an engagement event.
    async fn record_interaction(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        interaction: Interaction,
    ) -> Result<(), DomainError>;

    /// Delete a story.
    ///
    /// Fails with `DomainError::Ownership` if `user_id` is not the owner.
    async fn delete_story(&self, story_id: Uuid, user_id: Uuid) -> Result<(), DomainError>;
}
