//! Typed application configuration.

use keryx_core::ConfigError;
use serde::Deserialize;

/// Configuration for an [`Application`](crate::Application).
///
/// Deserializable from TOML:
///
/// ```toml
/// root_path = "/api/v1"
/// tracing_filter = "keryx=debug,info"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationConfig {
    /// Constant path prefix consumed by the routing tree root.
    pub root_path: String,
    /// Filter directive for [`init_tracing`](crate::telemetry::init_tracing);
    /// `None` falls back to the `RUST_LOG` environment variable.
    pub tracing_filter: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
            tracing_filter: None,
        }
    }
}

impl ApplicationConfig {
    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        toml::from_str(document).map_err(|error| ConfigError::InvalidConfig {
            reason: error.to_string(),
        })
    }
}
