//! Backend capability registry.
//!
//! The table is fixed when the binary is built. [`CapabilityRegistry::bootstrap`]
//! materialises it once per process; embedders and tests that need a
//! different table build one with [`CapabilityRegistry::from_entries`] and
//! hand it to the Context explicitly.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use crate::{BackendId, ComputeError};

/// Availability of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    pub backend: BackendId,
    /// Compiled into this build.
    pub available: bool,
    /// Every backend starts inactive until configuration asks for it.
    pub default_active: bool,
}

impl CapabilityEntry {
    pub const fn new(backend: BackendId, available: bool) -> Self {
        Self {
            backend,
            available,
            default_active: false,
        }
    }
}

/// Read-only table of compiled backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityRegistry {
    entries: BTreeMap<BackendId, CapabilityEntry>,
}

static BUILD_CAPABILITIES: OnceLock<CapabilityRegistry> = OnceLock::new();

impl CapabilityRegistry {
    /// The process-wide table derived from this build's features.
    pub fn bootstrap() -> &'static CapabilityRegistry {
        BUILD_CAPABILITIES.get_or_init(|| {
            let registry = Self::from_entries([
                CapabilityEntry::new(BackendId::ThreadParallel, cfg!(feature = "openmp")),
                CapabilityEntry::new(BackendId::DistributedRank, cfg!(feature = "distributed")),
                CapabilityEntry::new(BackendId::Accelerator, cfg!(feature = "accelerator")),
            ]);
            debug!(
                "[Capabilities] Bootstrapped: {}",
                registry.summary()
            );
            registry
        })
    }

    /// Build an explicit table. Later entries for the same backend win.
    pub fn from_entries(entries: impl IntoIterator<Item = CapabilityEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.backend, e)).collect(),
        }
    }

    /// Table with every backend marked available.
    pub fn all_available() -> Self {
        Self::from_entries(BackendId::ALL.map(|b| CapabilityEntry::new(b, true)))
    }

    /// Whether `backend` was compiled in. Backends without an entry report
    /// `false`.
    pub fn is_available(&self, backend: BackendId) -> bool {
        self.entries.get(&backend).is_some_and(|e| e.available)
    }

    /// Like [`Self::is_available`], as a `Result` for `?` chains.
    pub fn require(&self, backend: BackendId) -> Result<(), ComputeError> {
        if self.is_available(backend) {
            Ok(())
        } else {
            Err(ComputeError::BackendUnavailable(backend))
        }
    }

    pub fn entry(&self, backend: BackendId) -> Option<&CapabilityEntry> {
        self.entries.get(&backend)
    }

    pub fn available(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.entries
            .values()
            .filter(|e| e.available)
            .map(|e| e.backend)
    }

    /// `thread-parallel=yes distributed-rank=yes accelerator=no`
    pub fn summary(&self) -> String {
        BackendId::ALL
            .iter()
            .map(|b| {
                let flag = if self.is_available(*b) { "yes" } else { "no" };
                format!("{b}={flag}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
