//! Route resolution: recursive descent with quality-ranked backtracking.
//!
//! For each node, children are evaluated at the current path position,
//! failed branches are discarded, and the survivors are tried in quality
//! order (selector rank first, negotiation weight second, insertion order as
//! the stable tie-break). The first branch whose subtree resolves wins.
//!
//! A miss is not an error: the result carries the deepest node reached so
//! the caller can distinguish an unknown path from a known path lacking a
//! handler for the method.

use crate::node::{NodeId, RoutingTree};
use crate::quality::Quality;
use crate::selector::{Evaluation, SelectorMatch};
use keryx_core::{CallAttributes, ValueMap};
use tracing::trace;

/// Why resolution missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// No registered branch covers the path.
    NotFound,
    /// The full path matched a node with handlers, none for this method.
    MethodNotAllowed,
}

/// Outcome of resolving one call against a tree.
#[derive(Debug)]
pub struct ResolveResult {
    /// The terminal node on success; the deepest stall point on a miss.
    pub node: NodeId,
    /// Whether a handler for the call's method was reached.
    pub succeeded: bool,
    /// Parameters captured along the accepted path, in declaration order.
    pub values: ValueMap,
    /// Per-level quality scores along the accepted path, root first.
    pub quality: Vec<Quality>,
    /// Set on a miss, distinguishing 404-style from 405-style failures.
    pub miss: Option<Miss>,
}

/// Per-call resolution state: the decoded path split into segments plus a
/// borrow of the tree and attributes. Created fresh per call, discarded
/// after resolution.
#[derive(Debug)]
pub struct ResolveContext<'a> {
    tree: &'a RoutingTree,
    attributes: &'a CallAttributes,
    segments: Vec<String>,
}

impl<'a> ResolveContext<'a> {
    /// Prepares resolution of `attributes` against `tree`.
    ///
    /// The path is split on `/` with empty segments dropped, so redundant
    /// separators and a trailing slash do not affect matching.
    #[must_use]
    pub fn new(tree: &'a RoutingTree, attributes: &'a CallAttributes) -> Self {
        let segments = attributes
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect();
        Self {
            tree,
            attributes,
            segments,
        }
    }

    /// The decoded path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolves the call, never failing: misses are structured results.
    #[must_use]
    pub fn resolve(&self) -> ResolveResult {
        let root = self.tree.root();
        let root_selector = self.tree.selector(root);
        let Evaluation::Success(root_match) =
            root_selector.evaluate(self.attributes, &self.segments, 0)
        else {
            trace!(path = %self.attributes.path, "root prefix did not match");
            return self.miss_result(MissRecord::start(root));
        };

        let mut resolver = Resolver {
            context: self,
            best_miss: MissRecord::start(root),
        };
        match resolver.descend(root, root_match.segment_increment) {
            Some(resolved) => {
                let mut quality = vec![root_match.quality];
                quality.extend(resolved.quality);
                trace!(
                    path = %self.attributes.path,
                    route = %self.tree.path_of(resolved.node),
                    "route resolved"
                );
                ResolveResult {
                    node: resolved.node,
                    succeeded: true,
                    values: resolved.values,
                    quality,
                    miss: None,
                }
            }
            None => self.miss_result(resolver.best_miss),
        }
    }

    fn miss_result(&self, record: MissRecord) -> ResolveResult {
        let miss = if record.method_present {
            Miss::MethodNotAllowed
        } else {
            Miss::NotFound
        };
        trace!(
            path = %self.attributes.path,
            stalled_at = %self.tree.path_of(record.node),
            ?miss,
            "route miss"
        );
        ResolveResult {
            node: record.node,
            succeeded: false,
            values: ValueMap::new(),
            quality: Vec::new(),
            miss: Some(miss),
        }
    }
}

/// Values and qualities gathered below one node along the accepted path.
struct Resolved {
    node: NodeId,
    values: ValueMap,
    quality: Vec<Quality>,
}

/// The deepest dead end seen so far.
#[derive(Clone, Copy)]
struct MissRecord {
    depth: usize,
    node: NodeId,
    method_present: bool,
}

impl MissRecord {
    fn start(root: NodeId) -> Self {
        Self {
            depth: 0,
            node: root,
            method_present: false,
        }
    }
}

struct Resolver<'a, 'b> {
    context: &'b ResolveContext<'a>,
    best_miss: MissRecord,
}

struct Candidate {
    node: NodeId,
    matched: SelectorMatch,
}

impl Resolver<'_, '_> {
    fn descend(&mut self, node: NodeId, index: usize) -> Option<Resolved> {
        let context = self.context;
        let exhausted = index == context.segments.len();
        if exhausted
            && context
                .tree
                .handler_for(node, &context.attributes.method)
                .is_some()
        {
            return Some(Resolved {
                node,
                values: ValueMap::new(),
                quality: Vec::new(),
            });
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        for &child in context.tree.children(node) {
            let evaluation =
                context
                    .tree
                    .selector(child)
                    .evaluate(context.attributes, &context.segments, index);
            match evaluation {
                Evaluation::Success(matched) => candidates.push(Candidate {
                    node: child,
                    matched,
                }),
                // An absent optional element keeps the branch alive at the
                // weakest possible quality.
                Evaluation::Missing => candidates.push(Candidate {
                    node: child,
                    matched: SelectorMatch {
                        quality: Quality::MISSING,
                        captures: ValueMap::new(),
                        segment_increment: 0,
                    },
                }),
                Evaluation::Failed => {}
            }
        }

        // Stable sort: equal quality keeps registration order (tie-break).
        candidates.sort_by(|a, b| b.matched.quality.cmp(&a.matched.quality));

        for candidate in candidates {
            let next_index = index + candidate.matched.segment_increment;
            if let Some(deeper) = self.descend(candidate.node, next_index) {
                let mut values = candidate.matched.captures;
                values.merge(&deeper.values);
                let mut quality = vec![candidate.matched.quality];
                quality.extend(deeper.quality);
                return Some(Resolved {
                    node: deeper.node,
                    values,
                    quality,
                });
            }
        }

        self.record_miss(node, index, exhausted);
        None
    }

    fn record_miss(&mut self, node: NodeId, depth: usize, exhausted: bool) {
        let method_present = exhausted && self.context.tree.has_handlers(node);
        let better = depth > self.best_miss.depth
            || (depth == self.best_miss.depth && method_present && !self.best_miss.method_present);
        if better {
            self.best_miss = MissRecord {
                depth,
                node,
                method_present,
            };
        }
    }
}
