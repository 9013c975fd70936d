//! # AT-Compute: Backend Capabilities and Execution Engines
//!
//! Two concerns live here:
//!
//! 1. The [`CapabilityRegistry`]: a read-only table of which optional
//!    backends this build carries. It is bootstrapped once per process from
//!    cargo features and queried, never mutated, by everything above it.
//! 2. The engines that an activated backend brings up:
//!    [`ThreadParallelEngine`] (a dedicated Rayon pool) and
//!    [`AcceleratorDevice`] (the accelerator host execution space).
//!
//! ## Build Features
//!
//! | Feature | Default | Backend |
//! |---------|---------|---------|
//! | `openmp` | yes | thread-parallel |
//! | `distributed` | yes | distributed-rank |
//! | `accelerator` | no | accelerator |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use at_compute::{BackendId, CapabilityRegistry};
//!
//! let caps = CapabilityRegistry::bootstrap();
//! if caps.is_available(BackendId::ThreadParallel) {
//!     // -pk omp / -sf omp are legal
//! }
//! ```

pub mod backends;
pub mod capabilities;

pub use backends::accelerator::{AcceleratorDevice, AcceleratorSettings, ANNOUNCE_PREFIX};
pub use backends::threads::{ThreadParallelEngine, ThreadSettings};
pub use capabilities::{CapabilityEntry, CapabilityRegistry};
pub use shared_types::BackendId;

use thiserror::Error;

/// Compute engine errors
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("{0} backend is not available in this build")]
    BackendUnavailable(BackendId),

    #[error("Backend initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Invalid {backend} setting: {message}")]
    InvalidSetting {
        backend: BackendId,
        message: String,
    },
}

impl ComputeError {
    pub(crate) fn invalid(backend: BackendId, message: impl Into<String>) -> Self {
        ComputeError::InvalidSetting {
            backend,
            message: message.into(),
        }
    }
}

/// Parse a non-negative count argument.
pub(crate) fn parse_count(
    backend: BackendId,
    keyword: &str,
    value: Option<&String>,
) -> Result<usize, ComputeError> {
    let value =
        value.ok_or_else(|| ComputeError::invalid(backend, format!("'{keyword}' needs a value")))?;
    value.parse::<usize>().map_err(|_| {
        ComputeError::invalid(
            backend,
            format!("'{keyword}' expects a non-negative integer, got '{value}'"),
        )
    })
}
