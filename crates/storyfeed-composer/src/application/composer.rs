//! The story composer wizard.
//!
//! Holds one draft for one author. Steps advance only through their gates;
//! publishing uploads media once, creates the story, and resets the wizard.
//! A failed publish keeps the draft so the author can retry.

use std::collections::HashSet;
use std::sync::Arc;

use storyfeed_core::error::DomainError;
use storyfeed_core::media::{MediaFile, MediaUploader, ProgressFn};
use storyfeed_core::repository::StoryRepository;
use storyfeed_core::story::Story;
use uuid::Uuid;

use super::command_handlers::handle_publish_story;
use crate::config::ComposerConfig;
use crate::domain::commands::PublishStory;
use crate::domain::draft::{DraftContent, StoryDraft, WizardStep};
use crate::domain::media::{MediaKind, compress_image, object_key, validate_media};
use crate::error::ComposerError;

/// Creation wizard for one author.
pub struct StoryComposer {
    user_id: Option<Uuid>,
    owned_products: HashSet<Uuid>,
    repo: Arc<dyn StoryRepository>,
    uploader: Arc<dyn MediaUploader>,
    config: ComposerConfig,
    step: WizardStep,
    draft: StoryDraft,
}

impl StoryComposer {
    /// Creates a wizard for `user_id`, who may attach stories to
    /// `owned_products`.
    #[must_use]
    pub fn new(
        user_id: Option<Uuid>,
        owned_products: impl IntoIterator<Item = Uuid>,
        repo: Arc<dyn StoryRepository>,
        uploader: Arc<dyn MediaUploader>,
        config: ComposerConfig,
    ) -> Self {
        Self {
            user_id,
            owned_products: owned_products.into_iter().collect(),
            repo,
            uploader,
            config,
            step: WizardStep::SelectProduct,
            draft: StoryDraft::default(),
        }
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Current draft.
    #[must_use]
    pub fn draft(&self) -> &StoryDraft {
        &self.draft
    }

    /// Picks the product.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Ownership` for a product the author does not
    /// own, or `ComposerError::Create(Unauthenticated)` without an author.
    pub fn select_product(&mut self, product_id: Uuid) -> Result<(), ComposerError> {
        let user_id = self.user_id.ok_or(DomainError::Unauthenticated)?;
        if !self.owned_products.contains(&product_id) {
            return Err(ComposerError::Ownership {
                user_id,
                resource_id: product_id,
            });
        }
        self.draft.product_id = Some(product_id);
        Ok(())
    }

    /// Attaches a photo or video, replacing any earlier content.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` for an unsupported or oversized
    /// file. The draft is unchanged in that case.
    pub fn attach_media(&mut self, file: MediaFile) -> Result<MediaKind, ComposerError> {
        let kind = validate_media(&file, &self.config)?;
        tracing::debug!(file = %file.file_name, size = file.size(), ?kind, "media attached");
        self.draft.content = DraftContent::Media {
            file,
            kind,
            compressed: false,
            uploaded: None,
        };
        Ok(kind)
    }

    /// Uses styled text as the content.
    pub fn set_text(
        &mut self,
        content: impl Into<String>,
        background_color: impl Into<String>,
        text_color: impl Into<String>,
        font_size: u16,
    ) {
        self.draft.content = DraftContent::Text {
            content: content.into(),
            background_color: background_color.into(),
            text_color: text_color.into(),
            font_size,
        };
    }

    /// Uses a poll as the content.
    pub fn set_poll(&mut self, question: impl Into<String>, options: Vec<String>) {
        self.draft.content = DraftContent::Poll {
            question: question.into(),
            options,
        };
    }

    /// Uses a quiz as the content.
    pub fn set_quiz(
        &mut self,
        question: impl Into<String>,
        options: Vec<String>,
        answer_index: Option<usize>,
    ) {
        self.draft.content = DraftContent::Quiz {
            question: question.into(),
            options,
            answer_index,
        };
    }

    /// Sets or clears the caption.
    pub fn set_caption(&mut self, caption: Option<String>) {
        self.draft.caption = caption;
    }

    /// Sets or clears the requested duration. Values above the maximum are
    /// clamped on publish.
    pub fn set_duration(&mut self, duration_secs: Option<u32>) {
        self.draft.duration_secs = duration_secs;
    }

    /// Moves forward if the current step's gate passes.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` and stays put when the gate fails
    /// or there is no further step.
    pub fn next(&mut self) -> Result<WizardStep, ComposerError> {
        self.draft.check_step(self.step, &self.config)?;
        let next = self.step.next().ok_or_else(|| {
            ComposerError::Validation("already at the last step, publish instead".to_owned())
        })?;
        tracing::debug!(from = ?self.step, to = ?next, "composer step");
        self.step = next;
        Ok(next)
    }

    /// Moves back one step, keeping every field.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Discards the draft and returns to the first step.
    pub fn cancel(&mut self) {
        self.draft = StoryDraft::default();
        self.step = WizardStep::SelectProduct;
    }

    /// Uploads pending media and creates the story. On success the wizard
    /// resets; on failure the draft, including any finished upload, is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns `ComposerError::Validation` before the last step or when a
    /// gate fails, `ComposerError::Media` or `ComposerError::Upload` for
    /// media problems, and `ComposerError::Ownership` or
    /// `ComposerError::Create` when the backend refuses the story.
    #[tracing::instrument(skip_all, fields(user_id = ?self.user_id))]
    pub async fn publish(&mut self, on_progress: &ProgressFn) -> Result<Story, ComposerError> {
        let user_id = self.user_id.ok_or(DomainError::Unauthenticated)?;
        if self.step != WizardStep::AddCaption {
            return Err(ComposerError::Validation(
                "finish the previous steps first".to_owned(),
            ));
        }
        self.draft.check_complete(&self.config)?;
        let product_id = self
            .draft
            .product_id
            .ok_or_else(|| ComposerError::Validation("select a product first".to_owned()))?;

        self.upload_pending_media(user_id, on_progress).await?;

        let command = PublishStory {
            correlation_id: Uuid::new_v4(),
            user_id,
            product_id,
            content: self.draft.to_content()?,
            duration_secs: self.draft.effective_duration(&self.config),
            caption: self.draft.trimmed_caption(),
        };
        let story = handle_publish_story(&command, &self.config, self.repo.as_ref())
            .await
            .map_err(|error| {
                tracing::warn!(%error, "publish failed, draft kept");
                ComposerError::from(error)
            })?;
        self.cancel();
        Ok(story)
    }

    async fn upload_pending_media(
        &mut self,
        user_id: Uuid,
        on_progress: &ProgressFn,
    ) -> Result<(), ComposerError> {
        let DraftContent::Media {
            file,
            kind,
            compressed,
            uploaded,
        } = &mut self.draft.content
        else {
            return Ok(());
        };
        if uploaded.is_some() {
            tracing::debug!("reusing uploaded media");
            return Ok(());
        }
        if *kind == MediaKind::Image && !*compressed {
            let original = file.clone();
            let config = self.config.clone();
            *file = tokio::task::spawn_blocking(move || compress_image(&original, &config))
                .await
                .map_err(|e| ComposerError::Media(format!("compression task failed: {e}")))??;
            *compressed = true;
        }

        let key = object_key(user_id, file);
        let media = self
            .uploader
            .upload_media(&key, file, on_progress)
            .await
            .map_err(|error| {
                tracing::warn!(%error, key = %key, "media upload failed");
                ComposerError::Upload(error)
            })?;
        tracing::info!(key = %key, url = %media.url, "media uploaded");
        *uploaded = Some(media);
        Ok(())
    }
}
