//! Portable accelerator backend.
//!
//! Activated with `-k on [t N] [g N] [n N]`. The host execution space is a
//! Rayon pool; device offload beyond that is outside this crate.

use rayon::ThreadPool;
use tracing::info;

use crate::{parse_count, BackendId, ComputeError};

const BACKEND: BackendId = BackendId::Accelerator;

/// Fixed prefix of the line announcing an initialised accelerator.
pub const ANNOUNCE_PREFIX: &str = "Accelerator::Threads::";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceleratorSettings {
    /// Host threads per rank.
    pub threads: usize,
    /// Devices per node.
    pub devices: usize,
    /// NUMA domains per node.
    pub numa: usize,
}

impl Default for AcceleratorSettings {
    fn default() -> Self {
        Self {
            threads: 1,
            devices: 0,
            numa: 1,
        }
    }
}

impl AcceleratorSettings {
    /// Parse the keyword pairs following `-k on`.
    pub fn from_args(args: &[String]) -> Result<Self, ComputeError> {
        let mut settings = Self::default();
        let mut iter = args.iter();
        while let Some(keyword) = iter.next() {
            let value = iter.next();
            match keyword.as_str() {
                "t" | "threads" => settings.threads = parse_count(BACKEND, keyword, value)?,
                "g" | "gpus" => settings.devices = parse_count(BACKEND, keyword, value)?,
                "n" | "numa" => settings.numa = parse_count(BACKEND, keyword, value)?,
                other => {
                    return Err(ComputeError::invalid(
                        BACKEND,
                        format!("unknown accelerator keyword '{other}'"),
                    ))
                }
            }
        }
        if settings.threads == 0 {
            return Err(ComputeError::invalid(BACKEND, "thread count must be positive"));
        }
        if settings.numa == 0 {
            return Err(ComputeError::invalid(BACKEND, "numa count must be positive"));
        }
        Ok(settings)
    }
}

/// An initialised accelerator execution space.
pub struct AcceleratorDevice {
    settings: AcceleratorSettings,
    host: ThreadPool,
}

impl AcceleratorDevice {
    pub fn initialize(settings: AcceleratorSettings) -> Result<Self, ComputeError> {
        let host = super::build_pool("atomica-accel", settings.threads)?;
        info!(
            "[Compute] Accelerator initialised: {} host thread(s), {} device(s)",
            settings.threads, settings.devices
        );
        Ok(Self { settings, host })
    }

    pub fn settings(&self) -> &AcceleratorSettings {
        &self.settings
    }

    pub fn host_threads(&self) -> usize {
        self.host.current_num_threads()
    }

    /// Line written to the console once the device is up.
    pub fn announcement(&self) -> String {
        format!(
            "{ANNOUNCE_PREFIX}initialize: {} host thread(s), {} device(s), {} numa domain(s)",
            self.settings.threads, self.settings.devices, self.settings.numa
        )
    }

    /// Run `op` in the host execution space.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.host.install(op)
    }
}

impl std::fmt::Debug for AcceleratorDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcceleratorDevice")
            .field("settings", &self.settings)
            .finish()
    }
}
