//! Viewer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Milliseconds between progress ticks.
    pub tick_interval_ms: u64,
    /// Playback time of a slide without an explicit duration.
    pub default_slide_duration_ms: u64,
    /// Base URL for product deep links.
    pub share_base_url: String,
}

impl ViewerConfig {
    /// The tick period.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The default slide duration.
    #[must_use]
    pub fn default_slide_duration(&self) -> Duration {
        Duration::from_millis(self.default_slide_duration_ms)
    }

    /// Deep link to a product page.
    #[must_use]
    pub fn product_link(&self, product_id: uuid::Uuid) -> String {
        format!("{}/{product_id}", self.share_base_url.trim_end_matches('/'))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            default_slide_duration_ms: 5_000,
            share_base_url: "https://shop.example/products".to_owned(),
        }
    }
}
