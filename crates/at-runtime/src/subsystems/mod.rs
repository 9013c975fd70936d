//! # Standard Subsystem Handles
//!
//! One handle type per slot. Handles reference their dependencies by
//! [`SubsystemKind`] only; construction reads them through the
//! [`BuildScope`].
//!
//! | Level | Slots |
//! |-------|-------|
//! | base | memory, error, universe |
//! | input | input |
//! | particles | domain, atom |
//! | interaction | neighbor, comm, force |
//! | control | update, modify, group, output, timer |
//! | optional | citeme, accelerator, python |

mod base;
mod control;
mod input;
mod interaction;
mod optional;
mod particles;

pub use base::{Allocator, ErrorSink, UniverseView};
pub use control::{GroupManager, Integrator, ModifierRegistry, OutputManager, Timer, MAX_GROUPS};
pub use input::CommandInput;
pub use interaction::{Communicator, ForceEngine, NeighborManager};
pub use optional::{AcceleratorEngine, CitationCollector, ScriptingBridge};
pub use particles::{AtomStyle, Domain, ParticleContainer};

use std::borrow::Cow;
use std::sync::Arc;

use at_styles::{ModuleSet, StyleCategory, StyleRegistry, SuffixResolver, SuffixState};
use shared_types::{DynSubsystem, SubsystemError, SubsystemKind};

use crate::container::BuildScope;

/// Standard handle for `kind`.
pub(crate) fn build(kind: SubsystemKind, scope: &BuildScope<'_>) -> Result<DynSubsystem, SubsystemError> {
    let handle: DynSubsystem = match kind {
        SubsystemKind::Memory => Box::new(Allocator::build(scope)),
        SubsystemKind::Error => Box::new(ErrorSink::new()),
        SubsystemKind::Universe => Box::new(UniverseView::build(scope)),
        SubsystemKind::Input => Box::new(CommandInput::build(scope)?),
        SubsystemKind::Citation => Box::new(CitationCollector::new()),
        SubsystemKind::Domain => Box::new(Domain::default()),
        SubsystemKind::Atom => Box::new(ParticleContainer::build(scope)?),
        SubsystemKind::Neighbor => Box::new(NeighborManager::build(scope)),
        SubsystemKind::Comm => Box::new(Communicator::build(scope)),
        SubsystemKind::Force => Box::new(ForceEngine::build(scope)),
        SubsystemKind::Update => Box::new(Integrator::build(scope)),
        SubsystemKind::Modify => Box::new(ModifierRegistry::build(scope)),
        SubsystemKind::Group => Box::new(GroupManager::new()),
        SubsystemKind::Output => Box::new(OutputManager::build(scope)),
        SubsystemKind::Timer => Box::new(Timer::new()),
        SubsystemKind::Accelerator => Box::new(AcceleratorEngine::build(scope)?),
        SubsystemKind::Python => Box::new(ScriptingBridge::build(scope)?),
    };
    Ok(handle)
}

/// Owned copy of what a handle needs to resolve styles after construction.
#[derive(Debug, Clone)]
pub struct StyleContext {
    styles: Arc<StyleRegistry>,
    modules: ModuleSet,
    suffix: SuffixState,
}

impl StyleContext {
    pub(crate) fn from_scope(scope: &BuildScope<'_>) -> Self {
        Self {
            styles: Arc::clone(&scope.registries.styles),
            modules: scope.registries.modules.clone(),
            suffix: scope.config.suffix.clone(),
        }
    }

    pub fn resolve<'n>(&self, category: StyleCategory, requested: &'n str) -> Cow<'n, str> {
        SuffixResolver::new(&self.styles, &self.suffix).resolve(category, requested)
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn modules(&self) -> &ModuleSet {
        &self.modules
    }

    pub fn suffix(&self) -> &SuffixState {
        &self.suffix
    }
}
