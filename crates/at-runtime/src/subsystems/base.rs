//! Allocator, diagnostics and the universe view.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use shared_types::{Subsystem, SubsystemKind};
use tracing::warn;

use crate::container::BuildScope;
use crate::universe::Universe;

/// Memory allocator. The `memory/kk` variant allocates in the accelerator's
/// execution space.
#[derive(Debug)]
pub struct Allocator {
    variant: String,
}

impl Allocator {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            variant: scope.resolve_core("memory"),
        }
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn is_accelerated(&self) -> bool {
        self.variant != "memory"
    }
}

impl Subsystem for Allocator {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Memory
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "variant": self.variant })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Collects non-fatal diagnostics.
#[derive(Debug, Default)]
pub struct ErrorSink {
    warnings: AtomicUsize,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warning(&self, message: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        warn!("[Error] WARNING: {}", message);
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }
}

impl Subsystem for ErrorSink {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Error
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "warnings": self.warnings() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The Context's partitioned universe as a slot.
#[derive(Debug)]
pub struct UniverseView {
    universe: Universe,
}

impl UniverseView {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Self {
        Self {
            universe: scope.universe.clone(),
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }
}

impl Subsystem for UniverseView {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Universe
    }

    fn describe(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "world_size": self.universe.world().size(),
            "partitions": self.universe.partitions(),
            "iworld": self.universe.iworld(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
