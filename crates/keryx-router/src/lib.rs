//! Selector-tree routing for the Keryx framework.
//!
//! Routes are a tree of [`Selector`]s built during application
//! configuration, either from string patterns ([`RoutingTree::insert`]) or
//! through the fluent [`RouteBuilder`]. Resolution
//! ([`ResolveContext::resolve`]) walks the tree by recursive descent,
//! ranking competing branches with a two-part [`Quality`] score and
//! reporting misses as structured results rather than errors.
//!
//! ```rust
//! use keryx_router::{ResolveContext, RoutingTree};
//! use keryx_core::{BoxFuture, Call, CallAttributes, CallHandler, Method, PipelineError};
//! use std::sync::Arc;
//!
//! struct Show;
//!
//! impl CallHandler for Show {
//!     fn handle<'a>(&'a self, _call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
//!         Box::pin(async move { Ok(()) })
//!     }
//! }
//!
//! # fn main() -> Result<(), keryx_core::ConfigError> {
//! let mut tree = RoutingTree::new();
//! tree.insert("/users/{id}", Method::GET, Arc::new(Show))?;
//!
//! let attributes = CallAttributes::get("/users/42");
//! let result = ResolveContext::new(&tree, &attributes).resolve();
//! assert!(result.succeeded);
//! assert_eq!(result.values.get("id"), Some("42"));
//! # Ok(())
//! # }
//! ```

mod builder;
mod negotiation;
mod node;
mod pattern;
mod quality;
mod resolve;
mod selector;

pub use builder::RouteBuilder;
pub use negotiation::{media_match, parse_quality_list, Alternative, NegotiationError};
pub use node::{NodeId, RoutingTree};
pub use pattern::parse_pattern;
pub use quality::{Quality, Rank};
pub use resolve::{Miss, ResolveContext, ResolveResult};
pub use selector::{Evaluation, Selector, SelectorMatch};
