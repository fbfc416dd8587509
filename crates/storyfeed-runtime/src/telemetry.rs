//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::RuntimeError;

/// Installs the global subscriber. `RUST_LOG` selects levels and defaults
/// to `info`.
///
/// # Errors
///
/// Returns `RuntimeError::Config` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), RuntimeError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|e| RuntimeError::Config(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let _ = init_tracing(LogFormat::Json);

        let second = init_tracing(LogFormat::Pretty);

        assert!(matches!(second, Err(RuntimeError::Config(_))));
    }
}
