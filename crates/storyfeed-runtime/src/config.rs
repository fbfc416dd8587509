//! Runtime configuration.
//!
//! Values come from an optional YAML file, then `STORYFEED_*` environment
//! variables override individual keys. An override that does not parse is
//! logged and ignored, so a typo never takes the feed down.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storyfeed_composer::config::ComposerConfig;
use storyfeed_feed::config::FeedConfig;
use storyfeed_viewer::config::ViewerConfig;

use crate::error::RuntimeError;

/// Environment variable naming the YAML file.
pub const CONFIG_PATH_VAR: &str = "STORYFEED_CONFIG";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Settings for every story component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryFeedConfig {
    /// Log output format.
    pub log_format: LogFormat,
    /// Story bar and working-set settings.
    pub feed: FeedConfig,
    /// Playback settings.
    pub viewer: ViewerConfig,
    /// Creation wizard settings.
    pub composer: ComposerConfig,
}

impl StoryFeedConfig {
    /// Loads the file at `path` if given, applies overrides from the process
    /// environment and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Io` or `RuntimeError::Yaml` if the file cannot
    /// be read or parsed, and `RuntimeError::Config` if validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, RuntimeError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                tracing::info!(path = %path.display(), "loading configuration file");
                Self::from_yaml(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(std::env::vars());
        config.validate()?;
        Ok(config)
    }

    /// Parses YAML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Yaml` on malformed input.
    pub fn from_yaml(text: &str) -> Result<Self, RuntimeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies `STORYFEED_*` overrides from `vars`. Unknown keys are skipped.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "STORYFEED_LOG_FORMAT" => set(&mut self.log_format, key, value),
                "STORYFEED_SWEEP_INTERVAL_SECS" => {
                    set(&mut self.feed.sweep_interval_secs, key, value);
                }
                "STORYFEED_TICK_INTERVAL_MS" => set(&mut self.viewer.tick_interval_ms, key, value),
                "STORYFEED_DEFAULT_SLIDE_DURATION_MS" => {
                    set(&mut self.viewer.default_slide_duration_ms, key, value);
                }
                "STORYFEED_SHARE_BASE_URL" => set(&mut self.viewer.share_base_url, key, value),
                "STORYFEED_MAX_DURATION_SECS" => {
                    set(&mut self.composer.max_duration_secs, key, value);
                }
                "STORYFEED_DEFAULT_DURATION_SECS" => {
                    set(&mut self.composer.default_duration_secs, key, value);
                }
                "STORYFEED_MAX_IMAGE_WIDTH" => set(&mut self.composer.max_image_width, key, value),
                "STORYFEED_MAX_IMAGE_HEIGHT" => {
                    set(&mut self.composer.max_image_height, key, value);
                }
                "STORYFEED_JPEG_QUALITY" => set(&mut self.composer.jpeg_quality, key, value),
                "STORYFEED_MAX_IMAGE_BYTES" => set(&mut self.composer.max_image_bytes, key, value),
                "STORYFEED_MAX_VIDEO_BYTES" => set(&mut self.composer.max_video_bytes, key, value),
                _ => {}
            }
        }
    }

    /// Rejects settings the components cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Config` naming the first bad key.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        let composer = &self.composer;
        let checks = [
            (self.feed.sweep_interval_secs == 0, "feed.sweep_interval_secs must be positive"),
            (self.viewer.tick_interval_ms == 0, "viewer.tick_interval_ms must be positive"),
            (
                self.viewer.default_slide_duration_ms == 0,
                "viewer.default_slide_duration_ms must be positive",
            ),
            (
                self.viewer.share_base_url.trim().is_empty(),
                "viewer.share_base_url must not be empty",
            ),
            (composer.max_duration_secs == 0, "composer.max_duration_secs must be positive"),
            (
                composer.default_duration_secs == 0
                    || composer.default_duration_secs > composer.max_duration_secs,
                "composer.default_duration_secs must be between 1 and max_duration_secs",
            ),
            (
                composer.max_image_width == 0 || composer.max_image_height == 0,
                "composer.max_image_width and max_image_height must be positive",
            ),
            (
                !(1..=100).contains(&composer.jpeg_quality),
                "composer.jpeg_quality must be between 1 and 100",
            ),
        ];
        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(RuntimeError::Config((*message).to_owned())),
            None => Ok(()),
        }
    }
}

fn set<T>(target: &mut T, key: &str, value: &str)
where
    T: FromStr,
    T::Err: Display,
{
    match value.trim().parse() {
        Ok(parsed) => *target = parsed,
        Err(error) => tracing::warn!(key, value, %error, "ignoring invalid configuration override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_fills_missing_keys_with_defaults() {
        // Arrange
        let text = "log_format: pretty\nviewer:\n  tick_interval_ms: 50\ncomposer:\n  jpeg_quality: 70\n";

        // Act
        let config = StoryFeedConfig::from_yaml(text).unwrap();

        // Assert
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.viewer.tick_interval_ms, 50);
        assert_eq!(config.viewer.default_slide_duration_ms, 5_000);
        assert_eq!(config.composer.jpeg_quality, 70);
        assert_eq!(config.composer.max_duration_secs, 15);
        assert_eq!(config.feed, FeedConfig::default());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(StoryFeedConfig::from_yaml("  \n").unwrap(), StoryFeedConfig::default());
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let result = StoryFeedConfig::from_yaml("viewer: [1, 2");

        assert!(matches!(result, Err(RuntimeError::Yaml(_))));
    }

    #[test]
    fn test_overrides_replace_values_and_skip_invalid_ones() {
        // Arrange
        let mut config = StoryFeedConfig::default();
        let vars = [
            ("STORYFEED_SWEEP_INTERVAL_SECS", "30"),
            ("STORYFEED_LOG_FORMAT", "Pretty"),
            ("STORYFEED_JPEG_QUALITY", "not-a-number"),
            ("STORYFEED_SHARE_BASE_URL", "https://shop.test/p/"),
            ("HOME", "/root"),
        ];

        // Act
        config.apply_overrides(vars);

        // Assert
        assert_eq!(config.feed.sweep_interval_secs, 30);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.composer.jpeg_quality, 80);
        assert_eq!(config.viewer.share_base_url, "https://shop.test/p/");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(StoryFeedConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut zero_tick = StoryFeedConfig::default();
        zero_tick.viewer.tick_interval_ms = 0;
        let mut bad_quality = StoryFeedConfig::default();
        bad_quality.composer.jpeg_quality = 0;
        let mut default_over_max = StoryFeedConfig::default();
        default_over_max.composer.default_duration_secs = 20;

        for config in [zero_tick, bad_quality, default_over_max] {
            assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));
        }
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = StoryFeedConfig::load(None);

        assert!(config.is_ok());
    }
}
