//! Context error types.

use std::path::PathBuf;

use at_compute::{BackendId, ComputeError};
use at_styles::StyleError;
use shared_types::{SubsystemError, SubsystemErrorKind};
use thiserror::Error;

/// Malformed startup arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid command-line argument: {0}")]
    UnknownOption(String),

    #[error("Invalid command-line argument: {option} requires a value")]
    MissingValue { option: String },

    #[error("Invalid command-line argument: {option} {value} (expected {expected})")]
    InvalidValue {
        option: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid suffix: {0}")]
    Suffix(#[from] StyleError),
}

/// The three fatal error classes of context startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed or contradictory configuration.
    Configuration,
    /// A requested backend is not in this build.
    CapabilityMismatch,
    /// A style name had no factory when a subsystem instantiated it.
    UnresolvableStyle,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Configuration => "configuration",
            ErrorClass::CapabilityMismatch => "capability_mismatch",
            ErrorClass::UnresolvableStyle => "unresolvable_style",
        }
    }
}

/// Fatal context errors. None of them is retryable.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{option} requested but the {backend} backend is not available in this build")]
    CapabilityMismatch { backend: BackendId, option: String },

    #[error("Conflicting configuration: {0}")]
    Conflict(String),

    #[error("Unknown package style '{0}'")]
    UnknownPackage(String),

    #[error("Processor partitions do not match number of allocated processors: {requested} != {world}")]
    PartitionMismatch { requested: usize, world: usize },

    #[error("Invalid execution universe: {0}")]
    InvalidWorld(String),

    #[error("Execution universe already has a live context")]
    UniverseInUse,

    #[error("Cannot open {what} {}: {source}", .path.display())]
    Io {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Backend(#[from] ComputeError),

    #[error("Subsystem construction failed: {0}")]
    Subsystem(#[from] SubsystemError),
}

impl ContextError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ContextError::CapabilityMismatch { .. } => ErrorClass::CapabilityMismatch,
            ContextError::Backend(ComputeError::BackendUnavailable(_)) => {
                ErrorClass::CapabilityMismatch
            }
            ContextError::Subsystem(e) if e.error_kind == SubsystemErrorKind::UnresolvableStyle => {
                ErrorClass::UnresolvableStyle
            }
            _ => ErrorClass::Configuration,
        }
    }

    pub(crate) fn mismatch(backend: BackendId, option: impl Into<String>) -> Self {
        ContextError::CapabilityMismatch {
            backend,
            option: option.into(),
        }
    }
}
