//! Optional modules compiled into this build.

use std::collections::BTreeSet;

use at_compute::{BackendId, CapabilityRegistry};

/// Module supplying every accelerator-tagged style.
pub const ACCELERATOR_MODULE: &str = "ACCELERATOR";
/// Module supplying the `/omp` style variants.
pub const THREADS_MODULE: &str = "OPENMP";
pub const MOLECULE_MODULE: &str = "MOLECULE";

/// Set of installed module names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet {
    names: BTreeSet<String>,
}

impl ModuleSet {
    /// Modules of this build: one per available backend that supplies styles,
    /// plus the feature-gated style modules.
    pub fn for_build(capabilities: &CapabilityRegistry) -> Self {
        let mut names = BTreeSet::new();
        if capabilities.is_available(BackendId::ThreadParallel) {
            names.insert(THREADS_MODULE.to_string());
        }
        if capabilities.is_available(BackendId::Accelerator) {
            names.insert(ACCELERATOR_MODULE.to_string());
        }
        if cfg!(feature = "molecule") {
            names.insert(MOLECULE_MODULE.to_string());
        }
        Self { names }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_installed(&self, module: &str) -> bool {
        self.names.contains(module)
    }

    /// Installed modules in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
