//! Media upload collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A file picked by the user, held in memory until upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the picker.
    pub content_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Reference to uploaded media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Public URL of the stored object.
    pub url: String,
}

/// Upload progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Bytes sent so far.
    pub loaded: u64,
    /// Total bytes to send.
    pub total: u64,
    /// Whole percentage in `0..=100`.
    pub percentage: u8,
}

impl UploadProgress {
    /// Builds a snapshot, clamping `loaded` to `total`. An empty upload is
    /// reported as complete.
    #[must_use]
    pub fn new(loaded: u64, total: u64) -> Self {
        let loaded = loaded.min(total);
        let percentage = if total == 0 {
            100
        } else {
            // loaded <= total, so the quotient is at most 100.
            u8::try_from(loaded * 100 / total).unwrap_or(100)
        };
        Self {
            loaded,
            total,
            percentage,
        }
    }
}

/// Callback receiving upload progress.
pub type ProgressFn = dyn Fn(UploadProgress) + Send + Sync;

/// Uploads media to object storage.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload `file` under `object_key`, reporting progress as bytes go out.
    async fn upload_media(
        &self,
        object_key: &str,
        file: &MediaFile,
        on_progress: &ProgressFn,
    ) -> Result<MediaRef, DomainError>;
}
