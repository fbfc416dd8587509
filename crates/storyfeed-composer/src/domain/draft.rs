//! The story draft and its step gates.
//!
//! The wizard is strictly linear: select a product, add media or content,
//! then caption. Moving forward requires the gate of the current step to
//! pass; moving back never clears anything.

use serde::Serialize;
use storyfeed_core::media::{MediaFile, MediaRef};
use storyfeed_core::story::{PollOption, QuizOption, StoryContent};
use uuid::Uuid;

use super::media::{MediaKind, validate_media};
use crate::config::ComposerConfig;
use crate::error::ComposerError;

/// Wizard position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    /// Pick the product.
    SelectProduct,
    /// Attach media or build content.
    UploadMedia,
    /// Caption and duration.
    AddCaption,
}

impl WizardStep {
    /// The following step, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::SelectProduct => Some(Self::UploadMedia),
            Self::UploadMedia => Some(Self::AddCaption),
            Self::AddCaption => None,
        }
    }

    /// The preceding step, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::SelectProduct => None,
            Self::UploadMedia => Some(Self::SelectProduct),
            Self::AddCaption => Some(Self::UploadMedia),
        }
    }
}

/// What the story will show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DraftContent {
    /// Nothing chosen yet.
    #[default]
    Empty,
    /// A photo or video file.
    Media {
        /// The picked file. Images are replaced by their compressed form
        /// before upload.
        file: MediaFile,
        /// Image or video.
        kind: MediaKind,
        /// Whether `file` already went through compression.
        compressed: bool,
        /// Set once uploaded, so a retry does not upload again.
        uploaded: Option<MediaRef>,
    },
    /// Styled text.
    Text {
        /// Text body.
        content: String,
        /// Background colour.
        background_color: String,
        /// Text colour.
        text_color: String,
        /// Font size in points.
        font_size: u16,
    },
    /// A poll.
    Poll {
        /// Question, may be empty.
        question: String,
        /// Option labels as typed; blank entries are dropped on publish.
        options: Vec<String>,
    },
    /// A quiz.
    Quiz {
        /// Question.
        question: String,
        /// Option labels as typed; blank entries are dropped on publish.
        options: Vec<String>,
        /// Index into `options` of the correct answer.
        answer_index: Option<usize>,
    },
}

/// Local draft state. Nothing is persisted until publish succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryDraft {
    /// Selected product.
    pub product_id: Option<Uuid>,
    /// Media or content.
    pub content: DraftContent,
    /// Optional caption.
    pub caption: Option<String>,
    /// Requested duration in seconds.
    pub duration_secs: Option<u32>,
}

fn filled(options: &[String]) -> impl Iterator<Item = (usize, &str)> {
    options
        .iter()
        .map(|o| o.trim())
        .enumerate()
        .filter(|(_, o)| !o.is_empty())
}

fn invalid(message: &str) -> ComposerError {
    ComposerError::Validation(message.to_owned())
}

impl StoryDraft {
    /// Gate for leaving `step` forwards.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` naming what is missing.
    pub fn check_step(&self, step: WizardStep, config: &ComposerConfig) -> Result<(), ComposerError> {
        match step {
            WizardStep::SelectProduct => self
                .product_id
                .map(|_| ())
                .ok_or_else(|| invalid("select a product first")),
            WizardStep::UploadMedia => self.check_content(config),
            WizardStep::AddCaption => Ok(()),
        }
    }

    /// Every gate, in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing gate.
    pub fn check_complete(&self, config: &ComposerConfig) -> Result<(), ComposerError> {
        self.check_step(WizardStep::SelectProduct, config)?;
        self.check_step(WizardStep::UploadMedia, config)?;
        self.check_step(WizardStep::AddCaption, config)
    }

    fn check_content(&self, config: &ComposerConfig) -> Result<(), ComposerError> {
        match &self.content {
            DraftContent::Empty => Err(invalid("add a photo, a video or story content")),
            DraftContent::Media { file, .. } => validate_media(file, config).map(|_| ()),
            DraftContent::Text { content, .. } => {
                if content.trim().is_empty() {
                    Err(invalid("text stories need some text"))
                } else {
                    Ok(())
                }
            }
            DraftContent::Poll { options, .. } => {
                if filled(options).count() < 2 {
                    Err(invalid("a poll needs at least two options"))
                } else {
                    Ok(())
                }
            }
            DraftContent::Quiz {
                question,
                options,
                answer_index,
            } => {
                if question.trim().is_empty() {
                    return Err(invalid("a quiz needs a question"));
                }
                if filled(options).count() < 2 {
                    return Err(invalid("a quiz needs at least two options"));
                }
                match answer_index {
                    Some(index) if filled(options).any(|(i, _)| i == *index) => Ok(()),
                    _ => Err(invalid("mark one option as the correct answer")),
                }
            }
        }
    }

    /// Duration sent on publish: the requested or default value, clamped to
    /// `1..=max_duration_secs`.
    #[must_use]
    pub fn effective_duration(&self, config: &ComposerConfig) -> u32 {
        self.duration_secs
            .unwrap_or(config.default_duration_secs)
            .clamp(1, config.max_duration_secs.max(1))
    }

    /// The caption with surrounding whitespace removed, if anything is left.
    #[must_use]
    pub fn trimmed_caption(&self) -> Option<String> {
        self.caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
    }

    /// Builds the slide content. Media drafts use their uploaded reference.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` if the content gate fails or a
    /// media draft has not been uploaded.
    pub fn to_content(&self) -> Result<StoryContent, ComposerError> {
        match &self.content {
            DraftContent::Empty => Err(invalid("add a photo, a video or story content")),
            DraftContent::Media { kind, uploaded, .. } => {
                let media_url = uploaded
                    .as_ref()
                    .map(|m| m.url.clone())
                    .ok_or_else(|| invalid("media has not been uploaded"))?;
                Ok(match kind {
                    MediaKind::Image => StoryContent::Image { media_url },
                    MediaKind::Video => StoryContent::Video { media_url },
                })
            }
            DraftContent::Text {
                content,
                background_color,
                text_color,
                font_size,
            } => Ok(StoryContent::Text {
                content: content.trim().to_owned(),
                background_color: background_color.clone(),
                text_color: text_color.clone(),
                font_size: *font_size,
            }),
            DraftContent::Poll { question, options } => Ok(StoryContent::Poll {
                question: question.trim().to_owned(),
                options: filled(options)
                    .map(|(_, label)| PollOption {
                        label: label.to_owned(),
                        votes: 0,
                    })
                    .collect(),
            }),
            DraftContent::Quiz {
                question,
                options,
                answer_index,
            } => {
                let answer = answer_index.ok_or_else(|| invalid("mark one option as the correct answer"))?;
                let answer_index = filled(options)
                    .position(|(i, _)| i == answer)
                    .ok_or_else(|| invalid("mark one option as the correct answer"))?;
                Ok(StoryContent::Quiz {
                    question: question.trim().to_owned(),
                    options: filled(options)
                        .map(|(_, label)| QuizOption {
                            label: label.to_owned(),
                            answers: 0,
                        })
                        .collect(),
                    answer_index,
                })
            }
        }
    }
}
