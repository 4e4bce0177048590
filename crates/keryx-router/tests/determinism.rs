//! Property tests for resolution determinism.
//!
//! For a fixed tree and a fixed call, resolution must return the same node
//! and the same captured values on every invocation, regardless of path
//! shape. Nothing in the router may depend on hash iteration order.

use keryx_core::{BoxFuture, Call, CallAttributes, CallHandler, Method, PipelineError};
use keryx_router::{parse_pattern, ResolveContext, RoutingTree};
use proptest::prelude::*;
use std::sync::Arc;

struct Noop;

impl CallHandler for Noop {
    fn handle<'a>(&'a self, _call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move { Ok(()) })
    }
}

fn fixture_tree() -> RoutingTree {
    let mut tree = RoutingTree::new();
    for (pattern, method) in [
        ("/", Method::GET),
        ("/users", Method::GET),
        ("/users", Method::POST),
        ("/users/{id}", Method::GET),
        ("/users/self", Method::GET),
        ("/users/{id}/posts/{post}", Method::GET),
        ("/docs/{page?}", Method::GET),
        ("/files/{path...}", Method::GET),
        ("/mirror/*", Method::GET),
        ("/mirror/{named}", Method::POST),
    ] {
        tree.insert(pattern, method, Arc::new(Noop)).unwrap();
    }
    tree
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("users".to_string()),
        Just("self".to_string()),
        Just("docs".to_string()),
        Just("files".to_string()),
        Just("mirror".to_string()),
        Just("posts".to_string()),
        "[a-z0-9]{1,8}",
    ]
}

fn path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..6).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    #[test]
    fn resolution_is_deterministic(path in path(), get in proptest::bool::ANY) {
        let tree = fixture_tree();
        let method = if get { Method::GET } else { Method::POST };
        let attributes = CallAttributes::new(method, path);

        let first = ResolveContext::new(&tree, &attributes).resolve();
        for _ in 0..8 {
            let again = ResolveContext::new(&tree, &attributes).resolve();
            prop_assert_eq!(again.node, first.node);
            prop_assert_eq!(again.succeeded, first.succeeded);
            prop_assert_eq!(&again.values, &first.values);
            prop_assert_eq!(again.miss, first.miss);
        }
    }

    #[test]
    fn redundant_separators_never_change_the_result(path in path()) {
        let tree = fixture_tree();
        let doubled = path.replace('/', "//");

        let plain = CallAttributes::get(path);
        let noisy = CallAttributes::get(doubled);

        let a = ResolveContext::new(&tree, &plain).resolve();
        let b = ResolveContext::new(&tree, &noisy).resolve();
        prop_assert_eq!(a.node, b.node);
        prop_assert_eq!(a.succeeded, b.succeeded);
        prop_assert_eq!(&a.values, &b.values);
    }

    #[test]
    fn pattern_parser_never_panics(pattern in "[a-z{}?*./]{0,24}") {
        let _ = parse_pattern(&pattern);
    }
}
