//! Neighbor lists, inter-rank communication and forces.

use std::any::Any;
use std::borrow::Cow;

use at_styles::StyleCategory;
use serde_json::json;
use shared_types::{Subsystem, SubsystemKind};

use super::StyleContext;
use crate::container::BuildScope;

#[derive(Debug)]
pub struct NeighborManager {
    threaded: bool,
    skin: f64,
}

impl NeighborManager {
    pub const DEFAULT_SKIN: f64 = 0.3;

    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        let threaded = scope
            .backends
            .threads
            .as_ref()
            .is_some_and(|engine| engine.settings().neigh_threaded);
        Self {
            threaded,
            skin: Self::DEFAULT_SKIN,
        }
    }

    /// Neighbor lists are built on the thread-parallel pool.
    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    pub fn skin(&self) -> f64 {
        self.skin
    }
}

impl Subsystem for NeighborManager {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Neighbor
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "threaded": self.threaded, "skin": self.skin })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
pub struct Communicator {
    style: String,
    ranks: usize,
}

impl Communicator {
    pub const DEFAULT_STYLE: &'static str = "brick";

    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            style: scope.resolve(StyleCategory::Comm, Self::DEFAULT_STYLE),
            ranks: scope.universe.partition_size(),
        }
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Ranks exchanging ghost particles.
    pub fn ranks(&self) -> usize {
        self.ranks
    }
}

impl Subsystem for Communicator {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Comm
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "style": self.style, "ranks": self.ranks })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Force engine. Pair styles are chosen later by input commands.
#[derive(Debug)]
pub struct ForceEngine {
    resolver: StyleContext,
}

impl ForceEngine {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            resolver: StyleContext::from_scope(scope),
        }
    }

    /// Concrete pair style for `requested`.
    pub fn pair_style<'n>(&self, requested: &'n str) -> Cow<'n, str> {
        self.resolver.resolve(StyleCategory::Pair, requested)
    }
}

impl Subsystem for ForceEngine {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Force
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "suffix": self.resolver.suffix().to_string() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
