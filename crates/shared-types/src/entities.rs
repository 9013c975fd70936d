//! Core identifiers: backends, subsystem kinds and lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ParseIdError;

/// An optional parallel-execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    /// Shared-memory thread fan-out inside one rank.
    ThreadParallel,
    /// Distributed-memory ranks.
    DistributedRank,
    /// Portable accelerator offload.
    Accelerator,
}

impl BackendId {
    /// Every backend, in reporting order.
    pub const ALL: [BackendId; 3] = [
        BackendId::ThreadParallel,
        BackendId::DistributedRank,
        BackendId::Accelerator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BackendId::ThreadParallel => "thread-parallel",
            BackendId::DistributedRank => "distributed-rank",
            BackendId::Accelerator => "accelerator",
        }
    }

    /// Style suffix that selects this backend's specialised variants, if any.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            BackendId::ThreadParallel => Some("omp"),
            BackendId::Accelerator => Some("kk"),
            BackendId::DistributedRank => None,
        }
    }

    /// Backend whose specialised variants a suffix selects.
    pub fn from_suffix(suffix: &str) -> Option<BackendId> {
        Self::ALL.into_iter().find(|b| b.suffix() == Some(suffix))
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s)
            .ok_or_else(|| ParseIdError::new("backend", s))
    }
}

/// One long-lived subsystem slot owned by a Context.
///
/// Cross-references between subsystems are expressed as `SubsystemKind`
/// values and resolved by lookup, never by ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemKind {
    /// Allocator.
    Memory,
    /// Diagnostics / error sink.
    Error,
    /// Execution universe view.
    Universe,
    /// Command interpreter.
    Input,
    /// Citation collector (optional).
    Citation,
    /// Simulation box / geometry.
    Domain,
    /// Particle container.
    Atom,
    /// Neighbor manager.
    Neighbor,
    /// Inter-rank communicator.
    Comm,
    /// Force engine.
    Force,
    /// Time-stepper.
    Update,
    /// Modifier registry.
    Modify,
    /// Group manager.
    Group,
    /// Output manager.
    Output,
    /// Timer.
    Timer,
    /// Accelerator engine (optional).
    Accelerator,
    /// Scripting bridge (optional).
    Python,
}

impl SubsystemKind {
    /// The fixed, total construction order. Teardown walks it backwards.
    pub const CONSTRUCTION_ORDER: [SubsystemKind; 17] = [
        SubsystemKind::Memory,
        SubsystemKind::Error,
        SubsystemKind::Universe,
        SubsystemKind::Input,
        SubsystemKind::Citation,
        SubsystemKind::Domain,
        SubsystemKind::Atom,
        SubsystemKind::Neighbor,
        SubsystemKind::Comm,
        SubsystemKind::Force,
        SubsystemKind::Update,
        SubsystemKind::Modify,
        SubsystemKind::Group,
        SubsystemKind::Output,
        SubsystemKind::Timer,
        SubsystemKind::Accelerator,
        SubsystemKind::Python,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SubsystemKind::Memory => "memory",
            SubsystemKind::Error => "error",
            SubsystemKind::Universe => "universe",
            SubsystemKind::Input => "input",
            SubsystemKind::Citation => "citeme",
            SubsystemKind::Domain => "domain",
            SubsystemKind::Atom => "atom",
            SubsystemKind::Neighbor => "neighbor",
            SubsystemKind::Comm => "comm",
            SubsystemKind::Force => "force",
            SubsystemKind::Update => "update",
            SubsystemKind::Modify => "modify",
            SubsystemKind::Group => "group",
            SubsystemKind::Output => "output",
            SubsystemKind::Timer => "timer",
            SubsystemKind::Accelerator => "accelerator",
            SubsystemKind::Python => "python",
        }
    }

    /// Kinds this slot may hold non-owning references to.
    ///
    /// Every dependency appears earlier in [`Self::CONSTRUCTION_ORDER`].
    pub fn dependencies(&self) -> &'static [SubsystemKind] {
        use SubsystemKind::*;
        match self {
            Memory => &[],
            Error => &[Memory],
            Universe => &[Memory, Error],
            Input => &[Error, Universe],
            Citation => &[Universe],
            Domain => &[Universe],
            Atom => &[Memory, Domain],
            Neighbor => &[Domain, Atom],
            Comm => &[Universe, Domain, Atom],
            Force => &[Domain, Atom, Neighbor],
            Update => &[Domain, Atom, Force],
            Modify => &[Atom, Update],
            Group => &[Atom],
            Output => &[Update, Group],
            Timer => &[Universe],
            Accelerator => &[Universe],
            Python => &[Input],
        }
    }

    /// Whether the slot may legitimately stay empty in a fully built graph.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            SubsystemKind::Citation | SubsystemKind::Accelerator | SubsystemKind::Python
        )
    }

    /// Position in the construction order.
    pub fn ordinal(&self) -> usize {
        // CONSTRUCTION_ORDER lists every variant exactly once.
        Self::CONSTRUCTION_ORDER
            .iter()
            .position(|k| k == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for SubsystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// States of the Context lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Unconfigured,
    /// Arguments parsed, backends validated and activated.
    Activating,
    /// Every subsystem slot built.
    Constructed,
    /// Valid facade for callers.
    Operational,
    TearingDown,
    Destroyed,
}

impl LifecycleState {
    /// Whether `next` is a legal successor of `self`.
    ///
    /// `Activating -> Destroyed` covers help mode and aborted starts, which
    /// never reach `Constructed`.
    pub fn can_transition_to(&self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Unconfigured, Activating)
                | (Activating, Constructed)
                | (Activating, Destroyed)
                | (Constructed, Operational)
                | (Operational, TearingDown)
                | (TearingDown, Destroyed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Destroyed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
