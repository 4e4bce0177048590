//! Named pipeline phases and the standard pipeline kinds.

use std::fmt;

/// A named slot within a pipeline into which interceptors are registered.
///
/// Phase names are unique within one pipeline. The standard pipelines ship
/// with fixed phases (see [`names`]); plugins add their own, named after the
/// plugin identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phase(String);

impl Phase {
    /// Creates a phase with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The phase name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Which of the per-call pipelines an interception targets.
///
/// `AfterSend` is not a separate pipeline: it addresses the trailing
/// observation phase of the send pipeline, after response transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Request receive: runs before resolution-dependent call handling.
    Receive,
    /// Call handling: monitoring, plugins, and the route handler.
    Call,
    /// Response send: transformation and rendering of the response.
    Send,
    /// Post-transform observation at the tail of the send pipeline.
    AfterSend,
}

impl PipelineKind {
    /// The three real pipelines, in execution order.
    pub const ALL: [Self; 3] = [Self::Receive, Self::Call, Self::Send];
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Receive => "receive",
            Self::Call => "call",
            Self::Send => "send",
            Self::AfterSend => "after-send",
        };
        f.write_str(name)
    }
}

/// Standard phase names of the built-in pipelines.
pub mod names {
    /// First phase of the receive and send pipelines.
    pub const BEFORE: &str = "before";
    /// Payload transformation phase.
    pub const TRANSFORM: &str = "transform";
    /// Trailing phase of the receive and send pipelines; on the send
    /// pipeline this is the after-send observation slot.
    pub const AFTER: &str = "after";
    /// Call pipeline setup.
    pub const SETUP: &str = "setup";
    /// Call pipeline monitoring slot.
    pub const MONITORING: &str = "monitoring";
    /// Default slot for plugin interceptions on the call pipeline.
    pub const PLUGINS: &str = "plugins";
    /// Handler invocation slot.
    pub const CALL: &str = "call";
    /// Last-resort slot after the handler.
    pub const FALLBACK: &str = "fallback";
    /// Response rendering on the send pipeline.
    pub const RENDER: &str = "render";
}
