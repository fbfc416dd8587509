//! Feed configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the feed context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds between local expiration sweeps.
    pub sweep_interval_secs: u64,
}

impl FeedConfig {
    /// The sweep period as a `Duration`.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 60,
        }
    }
}
