//! Composer error types.

use storyfeed_core::error::DomainError;
use thiserror::Error;
use uuid::Uuid;

/// Why a composer action failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposerError {
    /// The draft does not pass a step gate. The user fixes the input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The media file could not be decoded or re-encoded.
    #[error("media processing failed: {0}")]
    Media(String),

    /// The media upload failed.
    #[error("upload failed: {0}")]
    Upload(DomainError),

    /// The user does not own the product or story.
    #[error("user {user_id} does not own {resource_id}")]
    Ownership {
        /// The acting user.
        user_id: Uuid,
        /// The product or story.
        resource_id: Uuid,
    },

    /// The backend rejected or failed the mutation.
    #[error("story mutation failed: {0}")]
    Create(DomainError),
}

impl ComposerError {
    /// Returns `true` when resubmitting the same draft may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upload(error) | Self::Create(error) => error.is_retryable(),
            Self::Validation(_) | Self::Media(_) | Self::Ownership { .. } => false,
        }
    }
}

impl From<DomainError> for ComposerError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Ownership {
                user_id,
                resource_id,
            } => Self::Ownership {
                user_id,
                resource_id,
            },
            DomainError::Validation(message) => Self::Validation(message),
            other => Self::Create(other),
        }
    }
}
