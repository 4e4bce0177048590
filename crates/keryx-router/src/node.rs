//! The routing tree: an arena of nodes linked by indices.
//!
//! Nodes live in one `Vec` owned by [`RoutingTree`]; parents and children
//! reference each other by [`NodeId`]. The parent link is non-owning and only
//! used for path reconstruction. The tree is mutated during the configuration
//! window and read-only (`&self`) while serving traffic, so concurrent calls
//! share it without locking.

use crate::pattern::parse_pattern;
use crate::selector::Selector;
use http::Method;
use keryx_core::{CallHandler, ConfigError};
use std::sync::Arc;
use tracing::debug;

/// Index of a node within its [`RoutingTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: Self = Self(0);
}

struct NodeData {
    selector: Selector,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    handlers: Vec<(Method, Arc<dyn CallHandler>)>,
}

/// A selector tree mapping call paths to handlers.
///
/// Built during application configuration via [`attach`](Self::attach),
/// [`child`](Self::child), the string-pattern [`insert`](Self::insert), or
/// the fluent [`RouteBuilder`](crate::builder::RouteBuilder). Registration
/// errors (ambiguous siblings, children behind a tailcard) are returned
/// immediately and are fatal to startup.
pub struct RoutingTree {
    nodes: Vec<NodeData>,
}

impl std::fmt::Debug for RoutingTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl RoutingTree {
    /// Creates a tree with an empty root.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_path("/")
    }

    /// Creates a tree whose root consumes the constant prefix `path`.
    ///
    /// Calls outside the prefix resolve to a miss at the root.
    #[must_use]
    pub fn with_root_path(path: &str) -> Self {
        let prefix: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect();
        Self {
            nodes: vec![NodeData {
                selector: Selector::Root { prefix },
                parent: None,
                children: Vec::new(),
                handlers: Vec::new(),
            }],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// The selector of `id`.
    #[must_use]
    pub fn selector(&self, id: NodeId) -> &Selector {
        &self.node(id).selector
    }

    /// The parent of `id`, `None` for the root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children of `id` in insertion order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Attaches a new child under `parent`.
    ///
    /// Rejects a duplicate `Constant` literal among the parent's children
    /// (the route would be ambiguous) and any child under a tailcard (a
    /// tailcard must be the last selector on its branch).
    pub fn attach(&mut self, parent: NodeId, selector: Selector) -> Result<NodeId, ConfigError> {
        if self.node(parent).selector.is_tailcard() {
            return Err(ConfigError::TailcardNotLast {
                parent: self.path_of(parent),
            });
        }
        if let Selector::Constant(literal) = &selector {
            let duplicate = self
                .node(parent)
                .children
                .iter()
                .any(|&child| matches!(self.node(child).selector, Selector::Constant(ref l) if l == literal));
            if duplicate {
                return Err(ConfigError::AmbiguousRoute {
                    literal: literal.clone(),
                    parent: self.path_of(parent),
                });
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            selector,
            parent: Some(parent),
            children: Vec::new(),
            handlers: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        debug!(path = %self.path_of(id), "route node attached");
        Ok(id)
    }

    /// Returns the child of `parent` with a structurally equal selector,
    /// creating it if absent.
    ///
    /// This is how the same path registered for several methods shares one
    /// node instead of tripping the ambiguity check.
    pub fn child(&mut self, parent: NodeId, selector: Selector) -> Result<NodeId, ConfigError> {
        let existing = self
            .node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).selector == selector);
        match existing {
            Some(child) => Ok(child),
            None => self.attach(parent, selector),
        }
    }

    /// Registers `handler` for `method` on `node`.
    pub fn add_handler(&mut self, node: NodeId, method: Method, handler: Arc<dyn CallHandler>) {
        debug!(path = %self.path_of(node), method = %method, handler = handler.name(), "handler registered");
        self.nodes[node.0].handlers.push((method, handler));
    }

    /// Registers a route from a string pattern, creating intermediate nodes
    /// as needed, and returns the terminal node.
    ///
    /// Pattern syntax: `{name}` required parameter, `{name?}` optional
    /// parameter, `*` wildcard, `{...}` / `{name...}` tailcard, anything
    /// else a constant literal. Redundant separators collapse.
    pub fn insert(
        &mut self,
        pattern: &str,
        method: Method,
        handler: Arc<dyn CallHandler>,
    ) -> Result<NodeId, ConfigError> {
        let selectors = parse_pattern(pattern)?;
        let mut current = self.root();
        for selector in selectors {
            current = self.child(current, selector)?;
        }
        self.add_handler(current, method, handler);
        Ok(current)
    }

    /// The handler registered on `node` for `method`, if any.
    #[must_use]
    pub fn handler_for(&self, node: NodeId, method: &Method) -> Option<&Arc<dyn CallHandler>> {
        self.node(node)
            .handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    /// Returns true if `node` has at least one handler for any method.
    #[must_use]
    pub fn has_handlers(&self, node: NodeId) -> bool {
        !self.node(node).handlers.is_empty()
    }

    /// Methods with handlers on `node`, in registration order, deduplicated.
    #[must_use]
    pub fn allowed_methods(&self, node: NodeId) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for (method, _) in &self.node(node).handlers {
            if !methods.contains(method) {
                methods.push(method.clone());
            }
        }
        methods
    }

    /// Reconstructs the route path of `node` from parent links, for
    /// diagnostics and error messages.
    #[must_use]
    pub fn path_of(&self, node: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let rendered = self.node(id).selector.to_string();
            if !rendered.is_empty() {
                parts.push(rendered);
            }
            current = self.node(id).parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }
}

impl Default for RoutingTree {
    fn default() -> Self {
        Self::new()
    }
}
