//! Per-call pipeline execution state.

use keryx_core::{Call, CancelToken};

/// The mutable state threaded through one call's pipeline execution.
///
/// Wraps the call together with the flow-control flags interceptors use:
/// finishing skips every remaining phase as normal control flow, and the
/// cancellation token is checked cooperatively between interceptors.
#[derive(Debug)]
pub struct PipelineContext<'c> {
    /// The call being processed.
    pub call: &'c mut Call,
    cancel: CancelToken,
    finished: bool,
}

impl<'c> PipelineContext<'c> {
    /// Wraps `call` for pipeline execution.
    #[must_use]
    pub fn new(call: &'c mut Call, cancel: CancelToken) -> Self {
        Self {
            call,
            cancel,
            finished: false,
        }
    }

    /// Marks the call finished: remaining interceptors and phases are
    /// skipped. This is not an error.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Returns true once an interceptor has finished the call.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Re-arms the context for the next pipeline of the same call.
    pub fn reset_finish(&mut self) {
        self.finished = false;
    }

    /// The call's cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns true if the call has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
