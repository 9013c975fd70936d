//! # Shared Types Crate
//!
//! Types every Atomica crate agrees on.
//!
//! ## Contents
//!
//! - [`BackendId`]: the optional parallel-execution backends a build may carry.
//! - [`SubsystemKind`]: one identifier per long-lived subsystem slot, with the
//!   fixed construction order and the back-references each slot may hold.
//! - [`LifecycleState`]: the Context state machine.
//! - [`Subsystem`] / [`SubsystemError`]: the opaque handle contract.

pub mod entities;
pub mod errors;
pub mod subsystem_trait;

pub use entities::*;
pub use errors::*;
pub use subsystem_trait::{DynSubsystem, Subsystem, SubsystemError, SubsystemErrorKind};
