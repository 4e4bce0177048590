//! # Keryx
//!
//! The routing-resolution and call-pipeline core of an HTTP application
//! framework:
//!
//! - **Selector-tree routing**: constant, parameter, optional, wildcard,
//!   tailcard, header-negotiation, and query selectors, ranked by a
//!   deterministic quality score with stable insertion-order tie-breaks
//! - **Phased pipelines**: receive, call, and send pipelines of named
//!   phases, executed in strict declared order per call
//! - **Plugins with relative ordering**: install interceptions before or
//!   after other plugins, independently per pipeline
//!
//! Transport is an external concern: an engine adapter decodes the wire
//! protocol into [`CallAttributes`](keryx_core::CallAttributes) and writes
//! the returned [`Response`](keryx_core::Response) back out.
//!
//! ## Quick start
//!
//! ```rust
//! use keryx::prelude::*;
//! use std::sync::Arc;
//!
//! struct Hello;
//!
//! impl CallHandler for Hello {
//!     fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
//!         Box::pin(async move {
//!             let name = call.parameters.get("name").unwrap_or("world").to_string();
//!             call.response.respond(StatusCode::OK, format!("hello, {name}"));
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), keryx_core::ConfigError> {
//! let mut app = Application::new();
//! app.route("/hello/{name?}", Method::GET, Arc::new(Hello))?;
//!
//! let response = app.dispatch(CallAttributes::get("/hello/keryx")).await;
//! assert_eq!(response.body.as_deref(), Some(&b"hello, keryx"[..]));
//! # Ok(())
//! # }
//! ```

mod application;
mod config;
mod plugins;
pub mod telemetry;

pub use application::Application;
pub use config::ApplicationConfig;
pub use plugins::RequestLog;

// Re-export the sub-crates for direct access.
pub use keryx_core as core;
pub use keryx_pipeline as pipeline;
pub use keryx_router as router;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use keryx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::Application;
    pub use crate::config::ApplicationConfig;
    pub use crate::plugins::RequestLog;
    pub use crate::telemetry::init_tracing;

    pub use keryx_core::{
        AttributeMap, BoxFuture, Call, CallAttributes, CallHandler, CancelToken, ConfigError,
        Method, PipelineError, RequestId, Response, StatusCode, ValueMap,
    };
    pub use keryx_pipeline::{
        Interceptor, Phase, Pipeline, PipelineContext, PipelineKind, PipelineSet, Plugin,
        PluginRegistry,
    };
    pub use keryx_router::{
        Miss, NodeId, Quality, Rank, ResolveContext, ResolveResult, RouteBuilder, RoutingTree,
        Selector,
    };
}
