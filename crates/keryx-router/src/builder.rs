//! Fluent route construction.
//!
//! A chaining alternative to string patterns. Both surfaces go through
//! [`RoutingTree::child`], so a route built here is structurally identical
//! to the same route registered from a pattern.
//!
//! # Example
//!
//! ```rust
//! use keryx_router::{RouteBuilder, RoutingTree};
//! use keryx_core::{BoxFuture, Call, CallHandler, Method, PipelineError, StatusCode};
//! use std::sync::Arc;
//!
//! struct Hello;
//!
//! impl CallHandler for Hello {
//!     fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
//!         Box::pin(async move {
//!             call.response.respond(StatusCode::OK, "hi");
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), keryx_core::ConfigError> {
//! let mut tree = RoutingTree::new();
//! RouteBuilder::new(&mut tree)
//!     .constant("users")?
//!     .parameter("id")?
//!     .handle(Method::GET, Arc::new(Hello));
//! # Ok(())
//! # }
//! ```

use crate::node::{NodeId, RoutingTree};
use crate::selector::Selector;
use http::Method;
use keryx_core::{CallHandler, ConfigError};
use std::sync::Arc;

/// Builds one route branch by descending from a node selector by selector.
#[must_use = "a route builder does nothing until a handler is registered"]
#[derive(Debug)]
pub struct RouteBuilder<'a> {
    tree: &'a mut RoutingTree,
    node: NodeId,
}

impl<'a> RouteBuilder<'a> {
    /// Starts building at the tree root.
    pub fn new(tree: &'a mut RoutingTree) -> Self {
        let node = tree.root();
        Self { tree, node }
    }

    /// Starts building at an existing node.
    pub fn at(tree: &'a mut RoutingTree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// Descends through `selector`, reusing a structurally equal child.
    pub fn select(mut self, selector: Selector) -> Result<Self, ConfigError> {
        self.node = self.tree.child(self.node, selector)?;
        Ok(self)
    }

    /// Descends through a constant literal segment.
    pub fn constant(self, literal: impl Into<String>) -> Result<Self, ConfigError> {
        self.select(Selector::Constant(literal.into()))
    }

    /// Descends through a required parameter segment.
    pub fn parameter(self, name: impl Into<String>) -> Result<Self, ConfigError> {
        self.select(Selector::Parameter { name: name.into() })
    }

    /// Descends through an optional parameter segment.
    pub fn optional_parameter(self, name: impl Into<String>) -> Result<Self, ConfigError> {
        self.select(Selector::OptionalParameter { name: name.into() })
    }

    /// Descends through an anonymous single-segment wildcard.
    pub fn wildcard(self) -> Result<Self, ConfigError> {
        self.select(Selector::Wildcard)
    }

    /// Descends through a named tailcard consuming all trailing segments.
    pub fn tailcard(self, name: impl Into<String>) -> Result<Self, ConfigError> {
        self.select(Selector::Tailcard {
            name: Some(name.into()),
            min_segments: 0,
        })
    }

    /// Descends through a header content-negotiation selector.
    pub fn accepts(
        self,
        header: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        self.select(Selector::HeaderQuality {
            header: header.into(),
            value: value.into(),
        })
    }

    /// Descends through a query-parameter presence selector.
    pub fn query_parameter(self, name: impl Into<String>) -> Result<Self, ConfigError> {
        self.select(Selector::QueryParameter { name: name.into() })
    }

    /// Descends through a constant query-parameter selector.
    pub fn query_value(
        self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        self.select(Selector::ConstantQueryParameter {
            name: name.into(),
            value: value.into(),
        })
    }

    /// The node this builder currently points at.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Registers `handler` for `method` at the current node and returns it.
    pub fn handle(self, method: Method, handler: Arc<dyn CallHandler>) -> NodeId {
        self.tree.add_handler(self.node, method, handler);
        self.node
    }
}
