//! Storyfeed — runtime error types.

use thiserror::Error;

/// Startup errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A configuration value is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for the expected shape.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
