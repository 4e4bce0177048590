//! Tracing subscriber setup.

use keryx_core::ConfigError;
use tracing_subscriber::EnvFilter;

/// Initializes a global `tracing` subscriber with an env-filter.
///
/// An explicit `filter` directive takes priority; otherwise the `RUST_LOG`
/// environment variable is consulted, falling back to `info`. Calling this
/// when a subscriber is already installed is a no-op, so tests may call it
/// freely.
pub fn init_tracing(filter: Option<&str>) -> Result<(), ConfigError> {
    let filter = match filter {
        Some(directive) => {
            EnvFilter::try_new(directive).map_err(|error| ConfigError::InvalidConfig {
                reason: format!("invalid tracing filter '{directive}': {error}"),
            })?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_config_error() {
        let err = init_tracing(Some("not==a==filter")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig { .. }));
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_tracing(Some("info")).unwrap();
        init_tracing(Some("debug")).unwrap();
    }
}
