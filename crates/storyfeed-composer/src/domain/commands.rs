//! Commands for the Composer context.

use storyfeed_core::command::Command;
use storyfeed_core::story::StoryContent;
use uuid::Uuid;

/// Command to publish a story on a product.
#[derive(Debug, Clone)]
pub struct PublishStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The author.
    pub user_id: Uuid,
    /// The product the story attaches to.
    pub product_id: Uuid,
    /// Slide content with media already uploaded.
    pub content: StoryContent,
    /// Requested duration in seconds.
    pub duration_secs: u32,
    /// Optional caption.
    pub caption: Option<String>,
}

impl Command for PublishStory {
    fn command_type(&self) -> &'static str {
        "composer.publish_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to delete one of the author's stories.
#[derive(Debug, Clone)]
pub struct DeleteStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The author.
    pub user_id: Uuid,
    /// The story to delete.
    pub story_id: Uuid,
}

impl Command for DeleteStory {
    fn command_type(&self) -> &'static str {
        "composer.delete_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn actor_id(&self) -> Uuid {
        self.user_id
    }
}
