//! Error taxonomy for the Keryx core.
//!
//! Two classes, strictly separated:
//!
//! - [`ConfigError`]: raised synchronously while routes, phases, or plugins
//!   are being registered. Fatal to application startup; never deferred to
//!   request time, and never produced while serving traffic.
//! - [`PipelineError`]: an interceptor or handler fault during one call.
//!   Aborts the remaining phases for that call only; the dispatch layer maps
//!   it to a generic failure response.
//!
//! Resolution misses (unknown path, wrong method) are *not* errors: they are
//! structured `succeeded = false` results produced by the router.

use thiserror::Error;

/// A configuration error raised during the startup window.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two constant segments with the same literal were attached as siblings.
    #[error("ambiguous route: constant segment '{literal}' registered twice under '{parent}'")]
    AmbiguousRoute {
        /// The duplicated literal.
        literal: String,
        /// Path of the parent node.
        parent: String,
    },

    /// A child was attached behind a tailcard selector.
    #[error("tailcard must be the last selector on a branch (under '{parent}')")]
    TailcardNotLast {
        /// Path of the offending tailcard node.
        parent: String,
    },

    /// A route pattern string could not be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A phase was referenced that is not registered in the pipeline.
    #[error("phase '{phase}' is not registered in this pipeline")]
    UnknownPhase {
        /// Name of the missing phase.
        phase: String,
    },

    /// A relative-ordering constraint referenced a plugin that was never installed.
    #[error("plugin '{plugin}' is referenced but was never installed")]
    PluginNotInstalled {
        /// Identity of the missing plugin.
        plugin: String,
    },

    /// The same plugin identity was installed twice.
    #[error("plugin '{plugin}' is already installed")]
    DuplicatePlugin {
        /// The duplicated identity.
        plugin: String,
    },

    /// Configuration input (file or string) could not be interpreted.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
}

/// A fault raised by an interceptor or handler while processing one call.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An interceptor or handler failed.
    #[error("interceptor fault: {0}")]
    Fault(#[from] anyhow::Error),

    /// A fault attributed to the phase it occurred in.
    #[error("interceptor fault in phase '{phase}': {source}")]
    Phased {
        /// Phase that was executing when the fault occurred.
        phase: String,
        /// The underlying fault.
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Wraps an arbitrary error as a pipeline fault.
    pub fn fault(source: impl Into<anyhow::Error>) -> Self {
        Self::Fault(source.into())
    }

    /// Creates a fault from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Fault(anyhow::anyhow!(message.into()))
    }

    /// Attributes this fault to `phase`, if not already attributed.
    #[must_use]
    pub fn in_phase(self, phase: &str) -> Self {
        match self {
            Self::Fault(source) => Self::Phased {
                phase: phase.to_string(),
                source,
            },
            phased @ Self::Phased { .. } => phased,
        }
    }
}
