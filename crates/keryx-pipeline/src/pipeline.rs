//! Ordered phases and their execution.
//!
//! A [`Pipeline`] is a strict total order of named phases, each holding
//! interceptors in registration order. Phases are arranged during the
//! configuration window (`add_phase`, `insert_phase_before/after`); execution
//! is read-only and shared freely across concurrent calls.

use crate::context::PipelineContext;
use crate::interceptor::Interceptor;
use crate::phase::{names, Phase, PipelineKind};
use keryx_core::{ConfigError, PipelineError};
use std::sync::Arc;
use tracing::trace;

struct PhaseEntry {
    phase: Phase,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

/// An ordered sequence of phases executed for one stage of call handling.
pub struct Pipeline {
    phases: Vec<PhaseEntry>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("phases", &self.phase_names())
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline with the given initial phases, in order.
    #[must_use]
    pub fn new<P: Into<Phase>>(phases: impl IntoIterator<Item = P>) -> Self {
        let mut pipeline = Self { phases: Vec::new() };
        for phase in phases {
            pipeline.add_phase(phase.into());
        }
        pipeline
    }

    /// The standard receive pipeline: `before`, `transform`, `after`.
    #[must_use]
    pub fn receive() -> Self {
        Self::new([names::BEFORE, names::TRANSFORM, names::AFTER])
    }

    /// The standard call pipeline: `setup`, `monitoring`, `plugins`,
    /// `call`, `fallback`.
    #[must_use]
    pub fn call() -> Self {
        Self::new([
            names::SETUP,
            names::MONITORING,
            names::PLUGINS,
            names::CALL,
            names::FALLBACK,
        ])
    }

    /// The standard send pipeline: `before`, `transform`, `render`,
    /// `after` (the after-send observation slot).
    #[must_use]
    pub fn send() -> Self {
        Self::new([names::BEFORE, names::TRANSFORM, names::RENDER, names::AFTER])
    }

    fn position(&self, phase: &Phase) -> Option<usize> {
        self.phases.iter().position(|entry| entry.phase == *phase)
    }

    /// Returns true if `phase` is registered.
    #[must_use]
    pub fn has_phase(&self, phase: &Phase) -> bool {
        self.position(phase).is_some()
    }

    /// Index of `phase` in execution order, if registered.
    #[must_use]
    pub fn phase_index(&self, phase: &Phase) -> Option<usize> {
        self.position(phase)
    }

    /// Phase names in execution order.
    #[must_use]
    pub fn phase_names(&self) -> Vec<&str> {
        self.phases
            .iter()
            .map(|entry| entry.phase.as_str())
            .collect()
    }

    /// Appends `phase` at the end; a no-op if it is already registered.
    pub fn add_phase(&mut self, phase: Phase) {
        if !self.has_phase(&phase) {
            self.phases.push(PhaseEntry {
                phase,
                interceptors: Vec::new(),
            });
        }
    }

    /// Inserts `phase` immediately after `reference`.
    ///
    /// A no-op if `phase` is already registered; fails if `reference` is not.
    pub fn insert_phase_after(&mut self, reference: &Phase, phase: Phase) -> Result<(), ConfigError> {
        let index = self.position(reference).ok_or_else(|| ConfigError::UnknownPhase {
            phase: reference.as_str().to_string(),
        })?;
        if !self.has_phase(&phase) {
            self.phases.insert(
                index + 1,
                PhaseEntry {
                    phase,
                    interceptors: Vec::new(),
                },
            );
        }
        Ok(())
    }

    /// Inserts `phase` immediately before `reference`.
    ///
    /// A no-op if `phase` is already registered; fails if `reference` is not.
    pub fn insert_phase_before(
        &mut self,
        reference: &Phase,
        phase: Phase,
    ) -> Result<(), ConfigError> {
        let index = self.position(reference).ok_or_else(|| ConfigError::UnknownPhase {
            phase: reference.as_str().to_string(),
        })?;
        if !self.has_phase(&phase) {
            self.phases.insert(
                index,
                PhaseEntry {
                    phase,
                    interceptors: Vec::new(),
                },
            );
        }
        Ok(())
    }

    /// Appends `interceptor` to `phase`, preserving registration order.
    pub fn intercept(
        &mut self,
        phase: &Phase,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<(), ConfigError> {
        let index = self.position(phase).ok_or_else(|| ConfigError::UnknownPhase {
            phase: phase.as_str().to_string(),
        })?;
        self.phases[index].interceptors.push(interceptor);
        Ok(())
    }

    /// Total number of registered interceptors.
    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.phases.iter().map(|entry| entry.interceptors.len()).sum()
    }

    /// Executes the pipeline for one call.
    ///
    /// Phases run in order, interceptors within a phase in registration
    /// order. A finished or cancelled context stops execution between
    /// interceptors without error; an interceptor fault aborts the rest and
    /// propagates, attributed to its phase.
    pub async fn execute(&self, cx: &mut PipelineContext<'_>) -> Result<(), PipelineError> {
        for entry in &self.phases {
            for interceptor in &entry.interceptors {
                if cx.is_finished() {
                    trace!(phase = %entry.phase, "pipeline finished early");
                    return Ok(());
                }
                if cx.is_cancelled() {
                    trace!(phase = %entry.phase, "pipeline cancelled");
                    return Ok(());
                }
                interceptor
                    .intercept(cx)
                    .await
                    .map_err(|fault| fault.in_phase(entry.phase.as_str()))?;
            }
        }
        Ok(())
    }
}

/// The three per-call pipelines of an application.
#[derive(Debug)]
pub struct PipelineSet {
    /// Request receive pipeline.
    pub receive: Pipeline,
    /// Call handling pipeline.
    pub call: Pipeline,
    /// Response send pipeline.
    pub send: Pipeline,
}

impl PipelineSet {
    /// Creates the standard three pipelines with their built-in phases.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            receive: Pipeline::receive(),
            call: Pipeline::call(),
            send: Pipeline::send(),
        }
    }

    /// The pipeline an interception kind targets.
    ///
    /// `AfterSend` addresses the send pipeline (its trailing `after` phase).
    #[must_use]
    pub fn pipeline(&self, kind: PipelineKind) -> &Pipeline {
        match kind {
            PipelineKind::Receive => &self.receive,
            PipelineKind::Call => &self.call,
            PipelineKind::Send | PipelineKind::AfterSend => &self.send,
        }
    }

    /// Mutable variant of [`PipelineSet::pipeline`].
    pub fn pipeline_mut(&mut self, kind: PipelineKind) -> &mut Pipeline {
        match kind {
            PipelineKind::Receive => &mut self.receive,
            PipelineKind::Call => &mut self.call,
            PipelineKind::Send | PipelineKind::AfterSend => &mut self.send,
        }
    }
}

impl Default for PipelineSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keryx_core::{BoxFuture, Call, CallAttributes, CancelToken};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records its name into a shared log when executed.
    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Interceptor for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn intercept<'a>(
            &'a self,
            _cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move {
                self.log.lock().unwrap().push(self.name);
                Ok(())
            })
        }
    }

    /// Finishes the call when executed.
    struct Finishing;

    impl Interceptor for Finishing {
        fn intercept<'a>(
            &'a self,
            cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move {
                cx.finish();
                Ok(())
            })
        }
    }

    /// Always faults.
    struct Faulting;

    impl Interceptor for Faulting {
        fn intercept<'a>(
            &'a self,
            _cx: &'a mut PipelineContext<'_>,
        ) -> BoxFuture<'a, Result<(), PipelineError>> {
            Box::pin(async move { Err(PipelineError::message("boom")) })
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn Interceptor> {
        Arc::new(Recording {
            name,
            log: log.clone(),
        })
    }

    #[test]
    fn test_phase_insertion_ordering() {
        let mut pipeline = Pipeline::new(["first", "last"]);
        pipeline
            .insert_phase_after(&Phase::new("first"), Phase::new("second"))
            .unwrap();
        pipeline
            .insert_phase_before(&Phase::new("last"), Phase::new("third"))
            .unwrap();

        assert_eq!(pipeline.phase_names(), ["first", "second", "third", "last"]);
    }

    #[test]
    fn test_unknown_reference_phase_is_config_error() {
        let mut pipeline = Pipeline::new(["only"]);
        let err = pipeline
            .insert_phase_after(&Phase::new("ghost"), Phase::new("new"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPhase { phase } if phase == "ghost"));

        let err = pipeline
            .intercept(&Phase::new("ghost"), Arc::new(Finishing))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPhase { .. }));
    }

    #[test]
    fn test_add_existing_phase_is_noop() {
        let mut pipeline = Pipeline::new(["a", "b"]);
        pipeline.add_phase(Phase::new("a"));
        assert_eq!(pipeline.phase_names(), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_execution_order_across_phases() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new(["early", "late"]);
        pipeline
            .intercept(&Phase::new("late"), recording("late-1", &log))
            .unwrap();
        pipeline
            .intercept(&Phase::new("early"), recording("early-1", &log))
            .unwrap();
        pipeline
            .intercept(&Phase::new("early"), recording("early-2", &log))
            .unwrap();

        let mut call = Call::new(CallAttributes::get("/"));
        let mut cx = PipelineContext::new(&mut call, CancelToken::new());
        pipeline.execute(&mut cx).await.unwrap();

        assert_eq!(*log.lock().unwrap(), ["early-1", "early-2", "late-1"]);
    }

    #[tokio::test]
    async fn test_finish_skips_remaining_phases() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new(["a", "b"]);
        pipeline
            .intercept(&Phase::new("a"), recording("before-finish", &log))
            .unwrap();
        pipeline.intercept(&Phase::new("a"), Arc::new(Finishing)).unwrap();
        pipeline
            .intercept(&Phase::new("b"), recording("skipped", &log))
            .unwrap();

        let mut call = Call::new(CallAttributes::get("/"));
        let mut cx = PipelineContext::new(&mut call, CancelToken::new());
        pipeline.execute(&mut cx).await.unwrap();

        assert!(cx.is_finished());
        assert_eq!(*log.lock().unwrap(), ["before-finish"]);
    }

    #[tokio::test]
    async fn test_fault_aborts_and_names_phase() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new(["work", "after"]);
        pipeline.intercept(&Phase::new("work"), Arc::new(Faulting)).unwrap();
        pipeline
            .intercept(&Phase::new("after"), recording("unreached", &log))
            .unwrap();

        let mut call = Call::new(CallAttributes::get("/"));
        let mut cx = PipelineContext::new(&mut call, CancelToken::new());
        let err = pipeline.execute(&mut cx).await.unwrap_err();

        assert!(err.to_string().contains("phase 'work'"));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_interceptors() {
        struct Cancelling {
            ran: Arc<AtomicUsize>,
        }

        impl Interceptor for Cancelling {
            fn intercept<'a>(
                &'a self,
                cx: &'a mut PipelineContext<'_>,
            ) -> BoxFuture<'a, Result<(), PipelineError>> {
                Box::pin(async move {
                    self.ran.fetch_add(1, Ordering::SeqCst);
                    cx.cancel_token().cancel();
                    Ok(())
                })
            }
        }

        let ran = Arc::new(AtomicUsize::new(0));
        let mut pipeline = Pipeline::new(["only"]);
        pipeline
            .intercept(&Phase::new("only"), Arc::new(Cancelling { ran: ran.clone() }))
            .unwrap();
        pipeline
            .intercept(&Phase::new("only"), Arc::new(Cancelling { ran: ran.clone() }))
            .unwrap();

        let mut call = Call::new(CallAttributes::get("/"));
        let mut cx = PipelineContext::new(&mut call, CancelToken::new());
        pipeline.execute(&mut cx).await.unwrap();

        // The second interceptor never runs.
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_standard_pipelines_phase_layout() {
        let set = PipelineSet::standard();
        assert_eq!(set.receive.phase_names(), ["before", "transform", "after"]);
        assert_eq!(
            set.call.phase_names(),
            ["setup", "monitoring", "plugins", "call", "fallback"]
        );
        assert_eq!(
            set.send.phase_names(),
            ["before", "transform", "render", "after"]
        );
        assert!(std::ptr::eq(
            set.pipeline(PipelineKind::AfterSend),
            set.pipeline(PipelineKind::Send)
        ));
    }
}
