//! Built-in plugins.

use keryx_core::{BoxFuture, PipelineError};
use keryx_pipeline::{Interceptor, PipelineContext, Plugin};
use std::time::Instant;
use tracing::info;

const START_KEY: &str = "request-log.start";

/// Structured per-call logging.
///
/// Records a start time on the call pipeline and emits one `info` event per
/// call from the after-send observation slot, carrying the request ID,
/// method, path, status, and elapsed time.
#[derive(Debug)]
pub struct RequestLog;

impl RequestLog {
    /// Identity this plugin installs under.
    pub const IDENTITY: &'static str = "request-log";

    /// Builds the plugin for installation.
    #[must_use]
    pub fn plugin() -> Plugin {
        Plugin::new(Self::IDENTITY)
            .on_call(StartTimer)
            .on_after_send(EmitLog)
    }
}

struct StartTimer;

impl Interceptor for StartTimer {
    fn name(&self) -> &str {
        "request-log.start"
    }

    fn intercept<'a>(
        &'a self,
        cx: &'a mut PipelineContext<'_>,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            cx.call.extensions.insert(START_KEY, Instant::now());
            Ok(())
        })
    }
}

struct EmitLog;

impl Interceptor for EmitLog {
    fn name(&self) -> &str {
        "request-log.emit"
    }

    fn intercept<'a>(
        &'a self,
        cx: &'a mut PipelineContext<'_>,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            let elapsed = cx
                .call
                .extensions
                .remove::<Instant>(START_KEY)
                .map(|start| start.elapsed());
            info!(
                request_id = %cx.call.request_id,
                method = %cx.call.attributes.method,
                path = %cx.call.attributes.path,
                status = cx.call.response.status.as_u16(),
                ?elapsed,
                "call completed"
            );
            Ok(())
        })
    }
}
