//! Command handlers for the Composer context.
//!
//! Handlers validate the command, delegate the mutation to the story
//! repository and log the outcome. The repository enforces ownership; its
//! errors are passed through unchanged.

use storyfeed_core::command::Command;
use storyfeed_core::error::DomainError;
use storyfeed_core::repository::{NewStory, StoryRepository};
use storyfeed_core::story::Story;

use crate::config::ComposerConfig;
use crate::domain::commands::{DeleteStory, PublishStory};

/// Handles the `PublishStory` command: clamps the duration and creates the
/// story.
///
/// # Errors
///
/// Returns `DomainError::Ownership` if the author does not own the product,
/// or the repository's error if creation fails.
#[tracing::instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        product_id = %command.product_id,
    )
)]
pub async fn handle_publish_story(
    command: &PublishStory,
    config: &ComposerConfig,
    repo: &dyn StoryRepository,
) -> Result<Story, DomainError> {
    let duration_secs = command
        .duration_secs
        .clamp(1, config.max_duration_secs.max(1));
    let new_story = NewStory {
        product_id: command.product_id,
        content: command.content.clone(),
        duration_secs,
        caption: command.caption.clone(),
    };

    let story = repo.create_story(command.actor_id(), new_story).await?;
    tracing::info!(
        story_id = %story.id,
        content_type = command.content.type_name(),
        duration_secs,
        "story published"
    );
    Ok(story)
}

/// Handles the `DeleteStory` command.
///
/// # Errors
///
/// Returns `DomainError::Ownership` if the author does not own the story,
/// `DomainError::NotFound` if it does not exist, or the repository's error.
#[tracing::instrument(
    skip_all,
    fields(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id,
        story_id = %command.story_id,
    )
)]
pub async fn handle_delete_story(
    command: &DeleteStory,
    repo: &dyn StoryRepository,
) -> Result<(), DomainError> {
    repo.delete_story(command.story_id, command.actor_id())
        .await?;
    tracing::info!("story deleted");
    Ok(())
}
