//! # Subsystem Handle Contract
//!
//! Every slot in a Context's subsystem arena holds a `Box<dyn Subsystem>`.
//! Handles are opaque to the Context: it constructs them once, keeps them for
//! its whole lifetime and drops them in reverse construction order.
//!
//! ## Example Implementation
//!
//! ```rust,ignore
//! use shared_types::{Subsystem, SubsystemKind};
//!
//! pub struct Timer { /* ... */ }
//!
//! impl Subsystem for Timer {
//!     fn kind(&self) -> SubsystemKind { SubsystemKind::Timer }
//!     fn as_any(&self) -> &dyn std::any::Any { self }
//! }
//! ```

use crate::entities::SubsystemKind;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Error raised while building or operating a subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemError {
    /// The subsystem that encountered the error.
    pub kind: SubsystemKind,
    pub error_kind: SubsystemErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl SubsystemError {
    pub fn new(
        kind: SubsystemKind,
        error_kind: SubsystemErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            error_kind,
            message: message.into(),
        }
    }

    pub fn initialization(kind: SubsystemKind, message: impl Into<String>) -> Self {
        Self::new(kind, SubsystemErrorKind::InitializationFailed, message)
    }

    pub fn missing_dependency(kind: SubsystemKind, dependency: SubsystemKind) -> Self {
        Self::new(
            kind,
            SubsystemErrorKind::MissingDependency,
            format!("{dependency} has not been constructed"),
        )
    }

    pub fn unresolvable_style(kind: SubsystemKind, message: impl Into<String>) -> Self {
        Self::new(kind, SubsystemErrorKind::UnresolvableStyle, message)
    }
}

impl fmt::Display for SubsystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.error_kind, self.message)
    }
}

impl std::error::Error for SubsystemError {}

/// Categories of subsystem errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsystemErrorKind {
    /// Subsystem failed to initialize.
    InitializationFailed,
    /// A referenced subsystem is not in the arena.
    MissingDependency,
    /// A style name had no factory, or its module is not installed.
    UnresolvableStyle,
    /// Configuration error.
    ConfigurationError,
}

impl fmt::Display for SubsystemErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed => write!(f, "InitializationFailed"),
            Self::MissingDependency => write!(f, "MissingDependency"),
            Self::UnresolvableStyle => write!(f, "UnresolvableStyle"),
            Self::ConfigurationError => write!(f, "ConfigurationError"),
        }
    }
}

/// The contract every subsystem handle implements.
pub trait Subsystem: Send {
    /// Slot this handle occupies.
    fn kind(&self) -> SubsystemKind;

    /// Human-readable name.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Diagnostic snapshot of the handle's configuration.
    fn describe(&self) -> serde_json::Value {
        serde_json::json!({ "name": self.name() })
    }

    /// Downcast support for typed accessors.
    fn as_any(&self) -> &dyn Any;
}

/// Type alias for a boxed subsystem.
pub type DynSubsystem = Box<dyn Subsystem>;
