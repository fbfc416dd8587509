//! The story model.
//!
//! A story is a time-limited attachment to a product. Its content is a list
//! of slides; each slide is one [`StoryContent`] variant carrying only the
//! fields that variant needs. A plain photo or video story is a story with a
//! single `Image` or `Video` slide.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hours a story stays visible after creation.
pub const STORY_LIFETIME_HOURS: i64 = 24;

/// Denormalised seller display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerInfo {
    /// Seller username.
    pub username: String,
    /// Seller avatar URL, if any.
    pub avatar_url: Option<String>,
}

/// Denormalised product display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    /// Product name.
    pub name: String,
    /// Product image URL, if any.
    pub image_url: Option<String>,
    /// Price in the smallest currency unit.
    pub price_cents: i64,
}

/// One poll answer and its vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    /// Option label.
    pub label: String,
    /// Votes recorded so far.
    pub votes: u64,
}

/// One quiz answer and how many viewers picked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Option label.
    pub label: String,
    /// Times this option was chosen.
    pub answers: u64,
}

/// Content of a single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoryContent {
    /// A still image.
    Image {
        /// Media URL.
        media_url: String,
    },
    /// A video clip.
    Video {
        /// Media URL.
        media_url: String,
    },
    /// Styled text on a coloured background.
    Text {
        /// Text body.
        content: String,
        /// CSS-style background colour.
        background_color: String,
        /// CSS-style text colour.
        text_color: String,
        /// Font size in points.
        font_size: u16,
    },
    /// A poll with free-form options.
    Poll {
        /// Poll question.
        question: String,
        /// Poll options with results.
        options: Vec<PollOption>,
    },
    /// A quiz with one correct answer.
    Quiz {
        /// Quiz question.
        question: String,
        /// Quiz options with results.
        options: Vec<QuizOption>,
        /// Index of the correct option.
        answer_index: usize,
    },
}

impl StoryContent {
    /// The wire name of this content type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Text { .. } => "text",
            Self::Poll { .. } => "poll",
            Self::Quiz { .. } => "quiz",
        }
    }

    /// The media URL for image and video content.
    #[must_use]
    pub fn media_url(&self) -> Option<&str> {
        match self {
            Self::Image { media_url } | Self::Video { media_url } => Some(media_url),
            Self::Text { .. } | Self::Poll { .. } | Self::Quiz { .. } => None,
        }
    }
}

/// One unit of playback within a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// What the slide shows.
    pub content: StoryContent,
    /// Explicit playback duration in seconds.
    pub duration_secs: Option<u32>,
}

impl Slide {
    /// Creates a slide without an explicit duration.
    #[must_use]
    pub fn new(content: StoryContent) -> Self {
        Self {
            content,
            duration_secs: None,
        }
    }
}

/// A time-limited media attachment to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: Uuid,
    /// Seller identifier. Missing on malformed upstream rows.
    pub seller_id: Option<Uuid>,
    /// Product the story is attached to.
    pub product_id: Uuid,
    /// Seller display data.
    pub seller: SellerInfo,
    /// Product display data.
    pub product: ProductSummary,
    /// Slides in playback order.
    pub slides: Vec<Slide>,
    /// Optional caption shown under the media.
    pub caption: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// End of the validity window (exclusive).
    pub expires_at: DateTime<Utc>,
    /// Views recorded by the backend.
    pub views_count: u64,
    /// Interactions recorded by the backend.
    pub interactions_count: u64,
    /// Whether the current viewer has seen this story.
    pub is_viewed: bool,
}

impl Story {
    /// Returns the expiry for a story created at `created_at`.
    #[must_use]
    pub fn expiry_for(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(STORY_LIFETIME_HOURS)
    }
}

/// An engagement event recorded against a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// The viewer liked the story.
    Like,
    /// The viewer shared the story.
    Share,
    /// The viewer opened the attached product.
    ProductClick,
    /// The viewer voted in a poll slide.
    PollVote {
        /// Chosen option.
        option_index: usize,
    },
    /// The viewer answered a quiz slide.
    QuizAnswer {
        /// Chosen option.
        option_index: usize,
    },
}

impl Interaction {
    /// The interaction kind as recorded by the backend.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Share => "share",
            Self::ProductClick => "product_click",
            Self::PollVote { .. } => "poll_vote",
            Self::QuizAnswer { .. } => "quiz_answer",
        }
    }
}
