//! Slots that a Context may leave empty.

use std::any::Any;
use std::collections::BTreeSet;

use at_compute::AcceleratorDevice;
use parking_lot::Mutex;
use serde_json::json;
use shared_types::{Subsystem, SubsystemError, SubsystemKind};
use tracing::info;

use super::CommandInput;
use crate::container::BuildScope;

pub(crate) const ACCELERATOR_CITATION: &str =
    "Accelerator backend: performance-portable execution spaces for particle simulation";

/// Citations owed by the features a run uses. Absent with `-nocite`.
#[derive(Debug, Default)]
pub struct CitationCollector {
    entries: Mutex<BTreeSet<String>>,
}

impl CitationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `citation`; false if it was already recorded.
    pub fn add(&self, citation: &str) -> bool {
        self.entries.lock().insert(citation.to_string())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Drop for CitationCollector {
    fn drop(&mut self) {
        let entries = self.entries.get_mut();
        if !entries.is_empty() {
            info!("[Citation] This run used {} feature(s) with citations:", entries.len());
            for entry in entries.iter() {
                info!("[Citation]   {}", entry);
            }
        }
    }
}

impl Subsystem for CitationCollector {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Citation
    }

    fn describe(&self) -> serde_json::Value {
        json!({ "name": self.name(), "entries": self.len() })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The initialised accelerator. Present exactly when the accelerator backend
/// is active.
#[derive(Debug)]
pub struct AcceleratorEngine {
    device: AcceleratorDevice,
}

impl AcceleratorEngine {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Result<Self, SubsystemError> {
        let settings = scope.backends.accelerator.ok_or_else(|| {
            SubsystemError::initialization(SubsystemKind::Accelerator, "accelerator backend is not active")
        })?;
        let device = AcceleratorDevice::initialize(settings)
            .map_err(|e| SubsystemError::initialization(SubsystemKind::Accelerator, e.to_string()))?;
        if let Some(citations) = scope.arena.get::<CitationCollector>(SubsystemKind::Citation) {
            citations.add(ACCELERATOR_CITATION);
        }
        Ok(Self { device })
    }

    pub fn device(&self) -> &AcceleratorDevice {
        &self.device
    }

    /// Console line announcing the device.
    pub fn announcement(&self) -> String {
        self.device.announcement()
    }
}

impl Subsystem for AcceleratorEngine {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Accelerator
    }

    fn describe(&self) -> serde_json::Value {
        let settings = self.device.settings();
        json!({
            "name": self.name(),
            "threads": settings.threads,
            "devices": settings.devices,
            "numa": settings.numa,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Embedded scripting bridge; always built in a full build.
#[derive(Debug)]
pub struct ScriptingBridge {
    variables: Vec<String>,
}

impl ScriptingBridge {
    pub(crate) fn build(scope: &BuildScope<'_>) -> Result<Self, SubsystemError> {
        let input = scope.require::<CommandInput>(SubsystemKind::Python, SubsystemKind::Input)?;
        Ok(Self {
            variables: input.variable_names().map(str::to_string).collect(),
        })
    }

    /// Names of the `-var` variables visible to scripts.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

impl Subsystem for ScriptingBridge {
    fn kind(&self) -> SubsystemKind {
        SubsystemKind::Python
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
