//! Storyfeed configuration check.
//!
//! Resolves the configuration the way an embedding application would, from
//! the file named by the first argument or `STORYFEED_CONFIG` plus
//! environment overrides, and prints the effective settings as YAML.

use std::error::Error;
use std::path::PathBuf;

use storyfeed_runtime::config::{CONFIG_PATH_VAR, StoryFeedConfig};
use storyfeed_runtime::telemetry::init_tracing;

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_PATH_VAR))
        .map(PathBuf::from);

    let config = StoryFeedConfig::load(path.as_deref())?;
    init_tracing(config.log_format)?;

    tracing::info!(
        sweep_interval_secs = config.feed.sweep_interval_secs,
        tick_interval_ms = config.viewer.tick_interval_ms,
        max_duration_secs = config.composer.max_duration_secs,
        "storyfeed configuration resolved"
    );
    print!("{}", serde_yaml::to_string(&config)?);

    Ok(())
}
