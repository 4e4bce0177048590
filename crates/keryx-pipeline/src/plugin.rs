//! Plugin installation with relative ordering.
//!
//! A plugin bundles interceptions for the receive, call, and send pipelines
//! (plus the after-send observation slot). Installing it creates one phase
//! per pipeline the plugin touches, named after the plugin, and places that
//! phase either at the end or relative to the phases of previously installed
//! plugins. The registry remembers what each plugin installed so later
//! plugins can order themselves against it.

use crate::interceptor::Interceptor;
use crate::phase::{names, Phase, PipelineKind};
use crate::pipeline::{Pipeline, PipelineSet};
use indexmap::IndexMap;
use keryx_core::ConfigError;
use std::sync::Arc;
use tracing::debug;

/// Where a plugin's phases are placed in each pipeline it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Append at the end of the pipeline.
    Default,
    /// Immediately after the last phase of the named plugins, per pipeline.
    AfterPlugins(Vec<String>),
    /// Immediately before the first phase of the named plugins, per pipeline.
    BeforePlugins(Vec<String>),
}

/// A plugin definition: identity, interceptions, and placement.
///
/// Built with chained calls, then handed to
/// [`PluginRegistry::install`].
///
/// # Example
///
/// ```rust,ignore
/// let plugin = Plugin::new("compression")
///     .on_send(Compress::default())
///     .after_plugins(["caching"]);
/// registry.install(&mut pipelines, plugin)?;
/// ```
pub struct Plugin {
    identity: String,
    placement: Placement,
    interceptions: Vec<(PipelineKind, Arc<dyn Interceptor>)>,
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("identity", &self.identity)
            .field("placement", &self.placement)
            .field("interceptions", &self.interceptions.len())
            .finish()
    }
}

impl Plugin {
    /// Starts a plugin definition with the given identity.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            placement: Placement::Default,
            interceptions: Vec::new(),
        }
    }

    /// The plugin identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Adds an interception to the named pipeline kind.
    #[must_use]
    pub fn intercept(mut self, kind: PipelineKind, interceptor: impl Interceptor) -> Self {
        self.interceptions.push((kind, Arc::new(interceptor)));
        self
    }

    /// Adds an interception to the receive pipeline.
    #[must_use]
    pub fn on_receive(self, interceptor: impl Interceptor) -> Self {
        self.intercept(PipelineKind::Receive, interceptor)
    }

    /// Adds an interception to the call pipeline.
    #[must_use]
    pub fn on_call(self, interceptor: impl Interceptor) -> Self {
        self.intercept(PipelineKind::Call, interceptor)
    }

    /// Adds an interception to the send pipeline.
    #[must_use]
    pub fn on_send(self, interceptor: impl Interceptor) -> Self {
        self.intercept(PipelineKind::Send, interceptor)
    }

    /// Adds an observation interception after response transformation.
    #[must_use]
    pub fn on_after_send(self, interceptor: impl Interceptor) -> Self {
        self.intercept(PipelineKind::AfterSend, interceptor)
    }

    /// Places this plugin's phases after the named plugins' phases, in
    /// every pipeline those plugins touch.
    #[must_use]
    pub fn after_plugins<I, S>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placement = Placement::AfterPlugins(identities.into_iter().map(Into::into).collect());
        self
    }

    /// Places this plugin's phases before the named plugins' phases, in
    /// every pipeline those plugins touch.
    #[must_use]
    pub fn before_plugins<I, S>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.placement = Placement::BeforePlugins(identities.into_iter().map(Into::into).collect());
        self
    }
}

struct InstalledPlugin {
    phases: Vec<(PipelineKind, Phase)>,
}

/// Tracks installed plugins and the phases they created.
#[derive(Default)]
pub struct PluginRegistry {
    installed: IndexMap<String, InstalledPlugin>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("installed", &self.identities())
            .finish()
    }
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a plugin with this identity has been installed.
    #[must_use]
    pub fn is_installed(&self, identity: &str) -> bool {
        self.installed.contains_key(identity)
    }

    /// Installed plugin identities, in installation order.
    #[must_use]
    pub fn identities(&self) -> Vec<&str> {
        self.installed.keys().map(String::as_str).collect()
    }

    /// Phases created by `identity` in pipelines of `kind`.
    #[must_use]
    pub fn phases_of(&self, identity: &str, kind: PipelineKind) -> Vec<&Phase> {
        self.installed
            .get(identity)
            .map(|plugin| {
                plugin
                    .phases
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, phase)| phase)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Installs `plugin` into `pipelines`.
    ///
    /// Creates a phase named after the plugin in each pipeline it has
    /// interceptions for and registers those interceptions there. With a
    /// relative placement, pipelines in which none of the referenced plugins
    /// created a phase are skipped entirely; referencing an identity that
    /// was never installed at all is a hard configuration error.
    pub fn install(&mut self, pipelines: &mut PipelineSet, plugin: Plugin) -> Result<(), ConfigError> {
        if self.is_installed(&plugin.identity) {
            return Err(ConfigError::DuplicatePlugin {
                plugin: plugin.identity,
            });
        }
        if let Placement::AfterPlugins(references) | Placement::BeforePlugins(references) =
            &plugin.placement
        {
            for reference in references {
                if !self.is_installed(reference) {
                    return Err(ConfigError::PluginNotInstalled {
                        plugin: reference.clone(),
                    });
                }
            }
        }

        let mut created: Vec<(PipelineKind, Phase)> = Vec::new();
        for kind in PipelineKind::ALL {
            let interceptors: Vec<&Arc<dyn Interceptor>> = plugin
                .interceptions
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, interceptor)| interceptor)
                .collect();
            if interceptors.is_empty() {
                continue;
            }

            let phase = Phase::new(plugin.identity.clone());
            let pipeline = pipelines.pipeline_mut(kind);
            match &plugin.placement {
                // Default placement appends, except that a trailing
                // observation phase stays last.
                Placement::Default => {
                    if pipeline.phase_names().last() == Some(&names::AFTER) {
                        pipeline.insert_phase_before(&Phase::new(names::AFTER), phase.clone())?;
                    } else {
                        pipeline.add_phase(phase.clone());
                    }
                }
                Placement::AfterPlugins(references) => {
                    let Some(anchor) = self.anchor(pipeline, references, kind, Pick::Last) else {
                        continue;
                    };
                    pipeline.insert_phase_after(&anchor, phase.clone())?;
                }
                Placement::BeforePlugins(references) => {
                    let Some(anchor) = self.anchor(pipeline, references, kind, Pick::First) else {
                        continue;
                    };
                    pipeline.insert_phase_before(&anchor, phase.clone())?;
                }
            }
            for interceptor in interceptors {
                pipeline.intercept(&phase, Arc::clone(interceptor))?;
            }
            created.push((kind, phase));
        }

        // After-send observations live in the standard trailing phase of
        // the send pipeline, not in a plugin phase.
        let after = Phase::new(names::AFTER);
        for (kind, interceptor) in &plugin.interceptions {
            if *kind == PipelineKind::AfterSend {
                pipelines
                    .pipeline_mut(PipelineKind::AfterSend)
                    .intercept(&after, Arc::clone(interceptor))?;
            }
        }

        debug!(plugin = %plugin.identity, phases = created.len(), "plugin installed");
        self.installed
            .insert(plugin.identity, InstalledPlugin { phases: created });
        Ok(())
    }

    /// The reference phase to insert next to: across every phase the named
    /// plugins created in this pipeline, the last (for after-placement) or
    /// first (for before-placement) in current execution order.
    fn anchor(
        &self,
        pipeline: &Pipeline,
        references: &[String],
        kind: PipelineKind,
        pick: Pick,
    ) -> Option<Phase> {
        let mut best: Option<(usize, &Phase)> = None;
        for reference in references {
            for phase in self.phases_of(reference, kind) {
                let Some(index) = pipeline.phase_index(phase) else {
                    continue;
                };
                let better = match (pick, &best) {
                    (_, None) => true,
                    (Pick::Last, Some((current, _))) => index > *current,
                    (Pick::First, Some((current, _))) => index < *current,
                };
                if better {
                    best = Some((index, phase));
                }
            }
        }
        best.map(|(_, phase)| phase.clone())
    }
}

#[derive(Clone, Copy)]
enum Pick {
    First,
    Last,
}
