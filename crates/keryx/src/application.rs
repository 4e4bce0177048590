//! The application: routing tree, pipelines, and dispatch.

use crate::config::ApplicationConfig;
use keryx_core::{
    Call, CallAttributes, CallHandler, CancelToken, ConfigError, Method, PipelineError, Response,
    StatusCode,
};
use keryx_pipeline::{
    Interceptor, Phase, Pipeline, PipelineContext, PipelineKind, PipelineSet, Plugin,
    PluginRegistry,
};
use keryx_router::{Miss, NodeId, ResolveContext, ResolveResult, RouteBuilder, RoutingTree};
use std::sync::Arc;
use tracing::{debug, error};

/// A configured application: the routing tree, the three call pipelines,
/// and the installed plugins.
///
/// Configuration (routes, plugins, interceptors) happens through `&mut self`
/// before traffic is accepted; [`dispatch`](Self::dispatch) takes `&self`,
/// so one application is shared read-only across all concurrent calls.
///
/// # Example
///
/// ```rust
/// use keryx::prelude::*;
/// use std::sync::Arc;
///
/// struct Hello;
///
/// impl CallHandler for Hello {
///     fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
///         Box::pin(async move {
///             call.response.respond(StatusCode::OK, "hello");
///             Ok(())
///         })
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), keryx_core::ConfigError> {
/// let mut app = Application::new();
/// app.route("/hello", Method::GET, Arc::new(Hello))?;
///
/// let response = app.dispatch(CallAttributes::get("/hello")).await;
/// assert_eq!(response.status, StatusCode::OK);
/// # Ok(())
/// # }
/// ```
pub struct Application {
    config: ApplicationConfig,
    tree: RoutingTree,
    pipelines: PipelineSet,
    registry: PluginRegistry,
}

enum Flow {
    Continue,
    Stop,
}

impl Application {
    /// Creates an application with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ApplicationConfig::default())
    }

    /// Creates an application from `config`.
    #[must_use]
    pub fn with_config(config: ApplicationConfig) -> Self {
        let tree = RoutingTree::with_root_path(&config.root_path);
        Self {
            config,
            tree,
            pipelines: PipelineSet::standard(),
            registry: PluginRegistry::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// The routing tree.
    #[must_use]
    pub fn tree(&self) -> &RoutingTree {
        &self.tree
    }

    /// The pipeline set.
    #[must_use]
    pub fn pipelines(&self) -> &PipelineSet {
        &self.pipelines
    }

    /// Registers a route from a string pattern.
    pub fn route(
        &mut self,
        pattern: &str,
        method: Method,
        handler: Arc<dyn CallHandler>,
    ) -> Result<NodeId, ConfigError> {
        self.tree.insert(pattern, method, handler)
    }

    /// Starts a fluent route builder at the tree root.
    pub fn routes(&mut self) -> RouteBuilder<'_> {
        RouteBuilder::new(&mut self.tree)
    }

    /// Installs a plugin, honoring its relative-ordering constraints.
    pub fn install(&mut self, plugin: Plugin) -> Result<(), ConfigError> {
        self.registry.install(&mut self.pipelines, plugin)
    }

    /// Returns true if a plugin with this identity is installed.
    #[must_use]
    pub fn has_plugin(&self, identity: &str) -> bool {
        self.registry.is_installed(identity)
    }

    /// Registers an interceptor directly into a standard phase.
    pub fn intercept(
        &mut self,
        kind: PipelineKind,
        phase: &str,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<(), ConfigError> {
        self.pipelines
            .pipeline_mut(kind)
            .intercept(&Phase::new(phase), interceptor)
    }

    /// Dispatches one call to completion.
    pub async fn dispatch(&self, attributes: CallAttributes) -> Response {
        self.dispatch_cancellable(attributes, CancelToken::new())
            .await
    }

    /// Dispatches one call with an externally controlled cancellation token.
    ///
    /// Resolution misses map to 404 or 405 (with an `Allow` header) without
    /// touching the pipelines. On a hit, the receive pipeline, call
    /// pipeline, route handler, and send pipeline run in order; an early
    /// finish or cancellation skips the remaining stages, and a fault aborts
    /// them and yields a generic 500.
    pub async fn dispatch_cancellable(
        &self,
        attributes: CallAttributes,
        cancel: CancelToken,
    ) -> Response {
        let resolved = ResolveContext::new(&self.tree, &attributes).resolve();
        if !resolved.succeeded {
            return self.miss_response(&resolved, &attributes);
        }
        let Some(handler) = self.tree.handler_for(resolved.node, &attributes.method) else {
            // A successful resolve guarantees a handler; treat anything else
            // as a miss rather than panicking in the serving path.
            return self.miss_response(&resolved, &attributes);
        };

        let mut call = Call::new(attributes).with_parameters(resolved.values);
        debug!(
            request_id = %call.request_id,
            method = %call.attributes.method,
            path = %call.attributes.path,
            route = %self.tree.path_of(resolved.node),
            "dispatching call"
        );

        match self.process(handler.as_ref(), &mut call, &cancel).await {
            Ok(()) => call.response,
            Err(fault) => {
                error!(request_id = %call.request_id, %fault, "pipeline fault");
                fault_response()
            }
        }
    }

    async fn process(
        &self,
        handler: &dyn CallHandler,
        call: &mut Call,
        cancel: &CancelToken,
    ) -> Result<(), PipelineError> {
        if let Flow::Stop = self.run_stage(&self.pipelines.receive, call, cancel).await? {
            return Ok(());
        }
        if let Flow::Stop = self.run_stage(&self.pipelines.call, call, cancel).await? {
            return Ok(());
        }
        handler.handle(call).await?;
        if cancel.is_cancelled() {
            return Ok(());
        }
        self.run_stage(&self.pipelines.send, call, cancel).await?;
        Ok(())
    }

    async fn run_stage(
        &self,
        pipeline: &Pipeline,
        call: &mut Call,
        cancel: &CancelToken,
    ) -> Result<Flow, PipelineError> {
        let mut cx = PipelineContext::new(call, cancel.clone());
        pipeline.execute(&mut cx).await?;
        if cx.is_finished() || cx.is_cancelled() {
            Ok(Flow::Stop)
        } else {
            Ok(Flow::Continue)
        }
    }

    fn miss_response(&self, resolved: &ResolveResult, attributes: &CallAttributes) -> Response {
        let mut response = Response::new();
        match resolved.miss {
            Some(Miss::MethodNotAllowed) => {
                let allow = self
                    .tree
                    .allowed_methods(resolved.node)
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                response.headers.append("Allow", allow);
                response.respond(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
            }
            _ => response.respond(StatusCode::NOT_FOUND, "not found"),
        }
        debug!(
            method = %attributes.method,
            path = %attributes.path,
            stalled_at = %self.tree.path_of(resolved.node),
            status = response.status.as_u16(),
            "route miss"
        );
        response
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

fn fault_response() -> Response {
    let mut response = Response::new();
    response.respond(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
    response
}
