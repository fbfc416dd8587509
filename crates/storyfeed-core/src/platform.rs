//! Platform sharing collaborator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content handed to the platform share sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    /// Share title (product name).
    pub title: String,
    /// Share text (caption or seller line).
    pub text: String,
    /// Deep link to the product.
    pub url: String,
}

/// Why a platform action could not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The platform has no such capability.
    #[error("platform action unavailable")]
    Unavailable,
    /// The platform reported a failure.
    #[error("platform action failed: {0}")]
    Failed(String),
}

/// Native share and clipboard access.
pub trait ShareSheet: Send + Sync {
    /// Open the native share sheet.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Unavailable` when sharing is not supported.
    fn share(&self, payload: &SharePayload) -> Result<(), PlatformError>;

    /// Copy text to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` when the clipboard cannot be written.
    fn copy_to_clipboard(&self, text: &str) -> Result<(), PlatformError>;
}
