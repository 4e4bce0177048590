//! The terminal handler invoked for a resolved route.

use crate::call::Call;
use crate::error::PipelineError;
use std::future::Future;
use std::pin::Pin;

/// A boxed future, the return type of handlers and interceptors.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A route handler: the terminal stage of call processing.
///
/// Handlers write into `call.response`; returning an error is a fault that
/// aborts the remaining pipeline stages for this call.
///
/// # Example
///
/// ```rust
/// use keryx_core::{BoxFuture, Call, CallHandler, PipelineError, StatusCode};
///
/// struct Hello;
///
/// impl CallHandler for Hello {
///     fn name(&self) -> &str {
///         "hello"
///     }
///
///     fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>> {
///         Box::pin(async move {
///             call.response.respond(StatusCode::OK, "hello");
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait CallHandler: Send + Sync + 'static {
    /// A stable name for logging and diagnostics.
    fn name(&self) -> &str {
        "<handler>"
    }

    /// Processes the call, writing the response in place.
    fn handle<'a>(&'a self, call: &'a mut Call) -> BoxFuture<'a, Result<(), PipelineError>>;
}
