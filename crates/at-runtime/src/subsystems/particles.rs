//! Simulation box and particle container.

use std::any::Any;

use at_styles::{StyleCategory, StyleError, StyleFactory};
use serde::Serialize;
use serde_json::json;
use shared_types::{Subsystem, SubsystemError, SubsystemKind};

use super::StyleContext;
use crate::container::BuildScope;

/// Simulation box geometry.
#[derive(Debug, Clone, Serialize)]
pub struct Domain {
    pub dimension: usize,
    pub periodicity: [bool; 3],
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            dimension: 3,
            periodicity: [true; 3],
        }
    }
}

impl Subsystem for Domain {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Domain
    }

    fn describe(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "dimension": self.dimension,
            "periodicity": self.periodicity,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One instantiated particle kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomStyle {
    pub name: String,
    /// Carries bond topology.
    pub molecular: bool,
    /// Lives in the accelerator's execution space.
    pub accelerated: bool,
}

impl AtomStyle {
    fn new(name: &str, molecular: bool) -> Self {
        Self {
            name: name.to_string(),
            molecular,
            accelerated: name.ends_with("/kk"),
        }
    }
}

const BUILTIN_KINDS: [&str; 7] = ["atomic", "body", "charge", "ellipsoid", "hybrid", "line", "sphere"];
const MOLECULAR_KINDS: [&str; 5] = ["angle", "bond", "full", "molecular", "template"];
const ACCELERATED_KINDS: [&str; 5] = ["atomic/kk", "bond/kk", "charge/kk", "full/kk", "sphere/kk"];

/// Particle container.
///
/// The container variant (`atom` or `atom/kk`) follows the accelerator; the
/// particle kind follows `-suffix`.
pub struct ParticleContainer {
    variant: String,
    style: AtomStyle,
    kinds: StyleFactory<AtomStyle>,
    resolver: StyleContext,
}

impl ParticleContainer {
    pub const DEFAULT_STYLE: &'static str = "atomic";

    pub(crate) fn build(scope: &BuildScope<'_>) -> Result<Self, SubsystemError> {
        let kinds = particle_kinds(&StyleContext::from_scope(scope));
        let style = scope.instantiate(SubsystemKind::Atom, &kinds, Self::DEFAULT_STYLE)?;
        Ok(Self {
            variant: scope.resolve_core("atom"),
            style,
            kinds,
            resolver: StyleContext::from_scope(scope),
        })
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn is_accelerated(&self) -> bool {
        self.variant != "atom"
    }

    pub fn style(&self) -> &AtomStyle {
        &self.style
    }

    /// Instantiate the particle kind `requested`, applying the suffixes.
    pub fn create_style(&self, requested: &str) -> Result<AtomStyle, StyleError> {
        let name = self.resolver.resolve(StyleCategory::Atom, requested);
        self.kinds
            .create(&name, self.resolver.styles(), self.resolver.modules())
    }

    /// Particle kinds this build can instantiate.
    pub fn available_styles(&self) -> impl Iterator<Item = &str> {
        self.kinds.names()
    }
}

fn particle_kinds(context: &StyleContext) -> StyleFactory<AtomStyle> {
    let mut kinds = StyleFactory::new(StyleCategory::Atom);
    for name in BUILTIN_KINDS {
        kinds.register(name, |n| AtomStyle::new(n, false));
    }
    for name in MOLECULAR_KINDS {
        kinds.register_installed(context.styles(), context.modules(), name, |n| {
            AtomStyle::new(n, true)
        });
    }
    for name in ACCELERATED_KINDS {
        let molecular = MOLECULAR_KINDS.iter().any(|m| name.starts_with(m));
        kinds.register_installed(context.styles(), context.modules(), name, move |n| {
            AtomStyle::new(n, molecular)
        });
    }
    kinds
}

impl std::fmt::Debug for ParticleContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleContainer")
            .field("variant", &self.variant)
            .field("style", &self.style)
            .finish()
    }
}

impl Subsystem for ParticleContainer {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Atom
    }

    fn describe(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "variant": self.variant,
            "style": self.style,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
