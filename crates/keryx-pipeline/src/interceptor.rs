//! The interceptor trait.

use crate::context::PipelineContext;
use keryx_core::{BoxFuture, PipelineError};

/// One unit of work within a pipeline phase.
///
/// Interceptors run in strict registration order within their phase. An
/// interceptor may mutate the call, finish it early through
/// [`PipelineContext::finish`] (skipping the remaining phases as normal
/// control flow), or return an error, which aborts the remaining phases for
/// this call and surfaces as a fault.
///
/// # Example
///
/// ```rust
/// use keryx_core::{BoxFuture, PipelineError};
/// use keryx_pipeline::{Interceptor, PipelineContext};
///
/// struct ServerHeader;
///
/// impl Interceptor for ServerHeader {
///     fn name(&self) -> &str {
///         "server-header"
///     }
///
///     fn intercept<'a>(
///         &'a self,
///         cx: &'a mut PipelineContext<'_>,
///     ) -> BoxFuture<'a, Result<(), PipelineError>> {
///         Box::pin(async move {
///             cx.call.response.headers.append("Server", "keryx");
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// A stable name for logging and diagnostics.
    fn name(&self) -> &str {
        "<interceptor>"
    }

    /// Processes the call at this phase.
    fn intercept<'a>(
        &'a self,
        cx: &'a mut PipelineContext<'_>,
    ) -> BoxFuture<'a, Result<(), PipelineError>>;
}
