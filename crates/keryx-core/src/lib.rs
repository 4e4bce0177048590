//! Core types and traits shared across the Keryx framework.
//!
//! This crate defines the vocabulary every other Keryx crate speaks:
//!
//! - [`AttributeMap`]: ordered multi-value string maps for headers and
//!   query parameters
//! - [`ValueMap`]: parameters captured during route resolution
//! - [`CallAttributes`], [`Call`], [`Response`]: the per-call model that
//!   flows through resolution and the interception pipelines
//! - [`CallHandler`]: the terminal handler invoked for a resolved route
//! - [`CancelToken`]: cooperative cancellation checked between interceptors
//! - [`ConfigError`], [`PipelineError`]: the error taxonomy, where
//!   configuration errors are fatal at startup and pipeline faults are
//!   local to one call
//!
//! Everything here is transport-agnostic: the engine adapter decodes the
//! wire protocol into [`CallAttributes`] and writes [`Response`] back out.

mod attributes;
mod call;
mod cancel;
mod error;
mod handler;
mod values;

pub use attributes::AttributeMap;
pub use call::{Call, CallAttributes, Extensions, RequestId, Response};
pub use cancel::CancelToken;
pub use error::{ConfigError, PipelineError};
pub use handler::{BoxFuture, CallHandler};
pub use values::ValueMap;

// Re-exported so downstream crates agree on the HTTP vocabulary.
pub use http::{Method, StatusCode};
