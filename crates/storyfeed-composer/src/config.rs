//! Composer configuration.

use serde::{Deserialize, Serialize};

/// Limits applied while composing a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Longest allowed story duration in seconds.
    pub max_duration_secs: u32,
    /// Duration used when the author sets none.
    pub default_duration_secs: u32,
    /// Compressed images fit inside this width.
    pub max_image_width: u32,
    /// Compressed images fit inside this height.
    pub max_image_height: u32,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
    /// Largest accepted image before compression.
    pub max_image_bytes: u64,
    /// Largest accepted video.
    pub max_video_bytes: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 15,
            default_duration_secs: 5,
            max_image_width: 1080,
            max_image_height: 1920,
            jpeg_quality: 80,
            max_image_bytes: 10 * 1024 * 1024,
            max_video_bytes: 50 * 1024 * 1024,
        }
    }
}
