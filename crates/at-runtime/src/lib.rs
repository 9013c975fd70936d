//! # Atomica Runtime
//!
//! The simulation context: startup options, backend activation, and the
//! ordered subsystem graph.
//!
//! ## Modules
//!
//! - `config/` - Command-line options ([`StartupConfig`])
//! - `context/` - The [`Context`] facade and its lifecycle
//! - `container/` - Subsystem arena, factories and lifecycle instrumentation
//! - `subsystems/` - Standard handles for every slot
//! - `universe` - Execution worlds and their partitioning
//! - `output` - Screen/log channels and the banner, summary and help text
//!
//! ## Startup Sequence
//!
//! 1. Parse the arguments
//! 2. Validate requested backends against the capability registry
//! 3. Claim the world and split it into partitions
//! 4. Emit the banner on rank 0
//! 5. Build subsystems in dependency order
//! 6. Operational until closed or dropped; teardown runs in reverse

#![allow(clippy::type_complexity)]

pub mod build_info;
pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod output;
pub mod subsystems;
pub mod universe;

pub use build_info::BuildInfo;
pub use config::{EchoMode, InputSource, OutputTarget, PackageDirective, StartupConfig};
pub use container::{
    BuildScope, LifecycleEvent, LifecycleJournal, LifecycleObserver, SubsystemArena,
    SubsystemFactories, SubsystemFactory,
};
pub use context::{ActiveBackends, Context, ContextBuilder, Registries, TeardownReport};
pub use error::{ConfigError, ContextError, ErrorClass};
pub use output::{Channel, SharedBuffer};
pub use universe::{Universe, World, WorldClaim};

pub use shared_types::{LifecycleState, Subsystem, SubsystemError, SubsystemKind};
