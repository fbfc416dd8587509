//! Test share sheet.

use std::sync::Mutex;

use storyfeed_core::platform::{PlatformError, SharePayload, ShareSheet};

/// A share sheet that records every call. When `share_available` is false,
/// `share` reports `PlatformError::Unavailable`.
#[derive(Debug)]
pub struct RecordingShareSheet {
    share_available: bool,
    shared: Mutex<Vec<SharePayload>>,
    copied: Mutex<Vec<String>>,
}

impl RecordingShareSheet {
    /// Create a share sheet with or without native sharing.
    #[must_use]
    pub fn new(share_available: bool) -> Self {
        Self {
            share_available,
            shared: Mutex::new(Vec::new()),
            copied: Mutex::new(Vec::new()),
        }
    }

    /// Payloads passed to the native share sheet.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn shared(&self) -> Vec<SharePayload> {
        self.shared.lock().unwrap().clone()
    }

    /// Text copied to the clipboard.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn copied(&self) -> Vec<String> {
        self.copied.lock().unwrap().clone()
    }
}

impl ShareSheet for RecordingShareSheet {
    fn share(&self, payload: &SharePayload) -> Result<(), PlatformError> {
        if !self.share_available {
            return Err(PlatformError::Unavailable);
        }
        self.shared.lock().unwrap().push(payload.clone());
        Ok(())
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), PlatformError> {
        self.copied.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}
