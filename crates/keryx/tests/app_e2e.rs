//! End-to-end application tests: routing, pipelines, and plugins together.

use keryx::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct Static(&'static str);

impl CallHandler for Static {
    fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            call.response.respond(StatusCode::OK, self.0);
            Ok(())
        })
    }
}

struct TailEcho;

impl CallHandler for TailEcho {
    fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            let joined = call
                .parameters
                .get_all("path")
                .unwrap_or_default()
                .join("/");
            call.response.respond(StatusCode::OK, joined);
            Ok(())
        })
    }
}

/// Appends a label to a shared log when its pipeline runs.
struct Mark {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Interceptor for Mark {
    fn intercept<'a>(
        &'a self,
        _cx: &'a mut PipelineContext<'_>,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            self.log.lock().unwrap().push(self.label);
            Ok(())
        })
    }
}

#[tokio::test]
async fn test_negotiated_route_selection() {
    let mut app = Application::new();
    app.routes()
        .constant("report")
        .unwrap()
        .accepts("Accept", "text/html")
        .unwrap()
        .handle(Method::GET, Arc::new(Static("<html>")));
    app.routes()
        .constant("report")
        .unwrap()
        .accepts("Accept", "text/plain")
        .unwrap()
        .handle(Method::GET, Arc::new(Static("plain")));

    let attributes =
        CallAttributes::get("/report").with_header("Accept", "text/plain, text/html; q=0.4");
    let response = app.dispatch(attributes).await;
    assert_eq!(response.body.as_deref(), Some(&b"plain"[..]));

    let attributes = CallAttributes::get("/report").with_header("Accept", "text/html");
    let response = app.dispatch(attributes).await;
    assert_eq!(response.body.as_deref(), Some(&b"<html>"[..]));
}

#[tokio::test]
async fn test_tailcard_route_serves_nested_paths() {
    let mut app = Application::new();
    app.route("/static/{path...}", Method::GET, Arc::new(TailEcho))
        .unwrap();

    let response = app
        .dispatch(CallAttributes::get("/static/css/site.css"))
        .await;
    assert_eq!(response.body.as_deref(), Some(&b"css/site.css"[..]));

    // Zero trailing segments still reach the handler with an empty capture.
    let response = app.dispatch(CallAttributes::get("/static")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_deref(), Some(&b""[..]));
}

#[tokio::test]
async fn test_plugin_relative_order_observed_during_dispatch() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut app = Application::new();
    app.route("/", Method::GET, Arc::new(Static("ok"))).unwrap();

    app.install(Plugin::new("anchor").on_call(Mark {
        label: "anchor",
        log: log.clone(),
    }))
    .unwrap();
    app.install(
        Plugin::new("tail")
            .on_call(Mark {
                label: "tail",
                log: log.clone(),
            })
            .after_plugins(["anchor"]),
    )
    .unwrap();
    app.install(
        Plugin::new("head")
            .on_call(Mark {
                label: "head",
                log: log.clone(),
            })
            .before_plugins(["anchor"]),
    )
    .unwrap();

    let response = app.dispatch(CallAttributes::get("/")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(*log.lock().unwrap(), ["head", "anchor", "tail"]);
}

#[tokio::test]
async fn test_missing_plugin_reference_fails_installation() {
    let mut app = Application::new();
    let err = app
        .install(Plugin::new("b").on_call(Mark {
            label: "b",
            log: Arc::new(Mutex::new(Vec::new())),
        }).after_plugins(["never-installed"]))
        .unwrap_err();
    assert!(matches!(err, ConfigError::PluginNotInstalled { .. }));
    assert!(!app.has_plugin("b"));
}

#[tokio::test]
async fn test_request_log_plugin_installs_and_runs() {
    let mut app = Application::new();
    app.route("/ping", Method::GET, Arc::new(Static("pong")))
        .unwrap();
    app.install(RequestLog::plugin()).unwrap();
    assert!(app.has_plugin(RequestLog::IDENTITY));

    let response = app.dispatch(CallAttributes::get("/ping")).await;
    assert_eq!(response.body.as_deref(), Some(&b"pong"[..]));
}

#[tokio::test]
async fn test_send_pipeline_decorates_response() {
    struct ServerHeader;

    impl Interceptor for ServerHeader {
        fn intercept<'a>(
            &'a self,
            cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move {
                cx.call.response.headers.append("Server", "keryx");
                Ok(())
            })
        }
    }

    let mut app = Application::new();
    app.route("/", Method::GET, Arc::new(Static("ok"))).unwrap();
    app.install(Plugin::new("server-header").on_send(ServerHeader))
        .unwrap();

    let response = app.dispatch(CallAttributes::get("/")).await;
    assert_eq!(response.headers.get("server"), Some("keryx"));
}

#[tokio::test]
async fn test_interceptor_fault_yields_500() {
    struct Fault;

    impl Interceptor for Fault {
        fn intercept<'a>(
            &'a self,
            _cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move { Err(PipelineError::message("boom")) })
        }
    }

    let hits = Arc::new(AtomicUsize::new(0));
    struct Count {
        hits: Arc<AtomicUsize>,
    }

    impl Interceptor for Count {
        fn intercept<'a>(
            &'a self,
            _cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move {
                self.hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    let mut app = Application::new();
    app.route("/", Method::GET, Arc::new(Static("ok"))).unwrap();
    app.install(Plugin::new("faulty").on_receive(Fault)).unwrap();
    app.install(Plugin::new("counter").on_send(Count { hits: hits.clone() }))
        .unwrap();

    let response = app.dispatch(CallAttributes::get("/")).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    // The send pipeline never ran after the receive fault.
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
