//! Per-slot factories and the scope they build from.

use std::collections::HashMap;
use std::fmt;

use at_styles::{StyleCategory, StyleFactory, SuffixResolver};
use at_telemetry::STYLE_RESOLUTIONS;
use shared_types::{DynSubsystem, SubsystemError, SubsystemKind};
use tracing::debug;

use super::SubsystemArena;
use crate::config::StartupConfig;
use crate::context::{ActiveBackends, Registries};
use crate::output::Channel;
use crate::subsystems;
use crate::universe::Universe;

/// Builds the handle of one slot.
pub type SubsystemFactory =
    Box<dyn Fn(&BuildScope<'_>) -> Result<DynSubsystem, SubsystemError> + Send + Sync>;

/// One factory per kind.
pub struct SubsystemFactories {
    factories: HashMap<SubsystemKind, SubsystemFactory>,
}

impl SubsystemFactories {
    /// Factories for the standard handles of every slot.
    pub fn standard() -> Self {
        let mut factories: HashMap<SubsystemKind, SubsystemFactory> = HashMap::new();
        for kind in SubsystemKind::CONSTRUCTION_ORDER {
            let factory: SubsystemFactory =
                Box::new(move |scope: &BuildScope<'_>| subsystems::build(kind, scope));
            factories.insert(kind, factory);
        }
        Self { factories }
    }

    /// Replace the factory of `kind`.
    pub fn with<F>(mut self, kind: SubsystemKind, factory: F) -> Self
    where
        F: Fn(&BuildScope<'_>) -> Result<DynSubsystem, SubsystemError> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
        self
    }

    pub(crate) fn build(
        &self,
        kind: SubsystemKind,
        scope: &BuildScope<'_>,
    ) -> Result<DynSubsystem, SubsystemError> {
        match self.factories.get(&kind) {
            Some(factory) => factory(scope),
            None => Err(SubsystemError::initialization(kind, "no factory registered")),
        }
    }
}

impl Default for SubsystemFactories {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for SubsystemFactories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("SubsystemFactories")
            .field("kinds", &kinds)
            .finish()
    }
}

/// Everything a factory may read: the startup options, the activated
/// backends, the registries, the open output channels and the slots built
/// so far.
pub struct BuildScope<'a> {
    pub config: &'a StartupConfig,
    pub universe: &'a Universe,
    pub registries: &'a Registries,
    pub backends: &'a ActiveBackends,
    pub arena: &'a SubsystemArena,
    /// Screen channel of the root rank; `None` elsewhere or for `-screen none`.
    pub screen: Option<&'a Channel>,
    pub log: Option<&'a Channel>,
    styles: SuffixResolver<'a>,
    core: SuffixResolver<'a>,
}

impl<'a> BuildScope<'a> {
    pub(crate) fn new(
        config: &'a StartupConfig,
        universe: &'a Universe,
        registries: &'a Registries,
        backends: &'a ActiveBackends,
        arena: &'a SubsystemArena,
    ) -> Self {
        Self {
            config,
            universe,
            registries,
            backends,
            arena,
            screen: None,
            log: None,
            styles: SuffixResolver::new(&registries.styles, &config.suffix),
            core: SuffixResolver::new(&registries.styles, &backends.core_suffix),
        }
    }

    pub(crate) fn with_channels(
        mut self,
        screen: Option<&'a Channel>,
        log: Option<&'a Channel>,
    ) -> Self {
        self.screen = screen;
        self.log = log;
        self
    }

    /// Concrete style name for `requested` under the Context's suffixes.
    pub fn resolve(&self, category: StyleCategory, requested: &str) -> String {
        resolve_with(&self.styles, category, requested)
    }

    /// Concrete variant of a core service (`memory`, `atom`). Accelerated
    /// variants are chosen only while the accelerator is active.
    pub fn resolve_core(&self, requested: &str) -> String {
        resolve_with(&self.core, StyleCategory::Core, requested)
    }

    /// Resolve `requested` and instantiate it from `factory`.
    pub fn instantiate<T>(
        &self,
        owner: SubsystemKind,
        factory: &StyleFactory<T>,
        requested: &str,
    ) -> Result<T, SubsystemError> {
        let name = self.resolve(factory.category(), requested);
        factory
            .create(&name, &self.registries.styles, &self.registries.modules)
            .map_err(|e| SubsystemError::unresolvable_style(owner, e.to_string()))
    }

    /// A dependency that must already be built.
    pub fn require<T: 'static>(
        &self,
        owner: SubsystemKind,
        dependency: SubsystemKind,
    ) -> Result<&'a T, SubsystemError> {
        self.arena
            .get::<T>(dependency)
            .ok_or_else(|| SubsystemError::missing_dependency(owner, dependency))
    }
}

fn resolve_with(resolver: &SuffixResolver<'_>, category: StyleCategory, requested: &str) -> String {
    let resolution = resolver.resolve_detailed(category, requested);
    STYLE_RESOLUTIONS
        .with_label_values(&[category.as_str(), resolution.outcome()])
        .inc();
    debug!(
        "[Styles] {} '{}' resolved to '{}' ({})",
        category,
        requested,
        resolution.name,
        resolution.outcome()
    );
    resolution.name.into_owned()
}
