//! Test uploaders — mock `MediaUploader` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storyfeed_core::error::DomainError;
use storyfeed_core::media::{MediaFile, MediaRef, MediaUploader, ProgressFn, UploadProgress};

/// An uploader that reports progress in four equal chunks and records every
/// upload as `(object_key, bytes uploaded)`. The first `failures` uploads
/// fail with an infrastructure error.
#[derive(Debug, Default)]
pub struct RecordingMediaUploader {
    failures: AtomicUsize,
    uploads: Mutex<Vec<(String, usize)>>,
}

impl RecordingMediaUploader {
    /// Create an uploader that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `failures` uploads.
    #[must_use]
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of successful uploads.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaUploader for RecordingMediaUploader {
    async fn upload_media(
        &self,
        object_key: &str,
        file: &MediaFile,
        on_progress: &ProgressFn,
    ) -> Result<MediaRef, DomainError> {
        let total = file.size();
        on_progress(UploadProgress::new(0, total));
        if self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DomainError::Infrastructure("upload interrupted".into()));
        }
        for step in 1..=4 {
            on_progress(UploadProgress::new(total * step / 4, total));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((object_key.to_owned(), file.bytes.len()));
        Ok(MediaRef {
            url: format!("https://cdn.test/{object_key}"),
        })
    }
}

/// An uploader that always fails.
#[derive(Debug)]
pub struct FailingMediaUploader;

#[async_trait]
impl MediaUploader for FailingMediaUploader {
    async fn upload_media(
        &self,
        _object_key: &str,
        _file: &MediaFile,
        _on_progress: &ProgressFn,
    ) -> Result<MediaRef, DomainError> {
        Err(DomainError::Infrastructure("storage unavailable".into()))
    }
}
