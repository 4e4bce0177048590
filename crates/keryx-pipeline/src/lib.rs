//! Phased interception pipelines for the Keryx framework.
//!
//! A [`Pipeline`] is an ordered list of named [`Phase`]s, each holding
//! [`Interceptor`]s in registration order. Three pipelines run per call
//! (receive, call handling, send), collected in a [`PipelineSet`].
//! [`Plugin`]s install interceptions across the set, optionally ordered
//! relative to previously installed plugins through the [`PluginRegistry`].
//!
//! Pipelines are arranged during the configuration window and executed
//! read-only, so one set is shared by every concurrent call. Execution
//! honors early finish ([`PipelineContext::finish`]) and cooperative
//! cancellation as normal control flow; interceptor faults abort the
//! remaining phases of the call and propagate.

mod context;
mod interceptor;
mod phase;
mod pipeline;
mod plugin;

pub use context::PipelineContext;
pub use interceptor::Interceptor;
pub use phase::{names, Phase, PipelineKind};
pub use pipeline::{Pipeline, PipelineSet};
pub use plugin::{Placement, Plugin, PluginRegistry};
