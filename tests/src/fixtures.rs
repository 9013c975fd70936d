//! Context harness shared by the integration tests.
//!
//! Every harness owns a private single-rank [`World`], so tests running in
//! parallel never contend for the process-wide world.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use at_compute::{BackendId, CapabilityEntry, CapabilityRegistry};
use at_runtime::{
    BuildInfo, BuildScope, Channel, Context, ContextBuilder, ContextError, LifecycleJournal,
    Registries, SharedBuffer, World,
};
use at_styles::StyleRegistry;
use parking_lot::Mutex;
use shared_types::{DynSubsystem, Subsystem, SubsystemError, SubsystemKind};

pub const EXE: &str = "atomica_test";

/// `-log none -echo screen -nocite`
pub const PLAIN_ARGS: &[&str] = &["-log", "none", "-echo", "screen", "-nocite"];
/// `-log none -pk omp 2 neigh yes -sf omp`
pub const THREAD_ARGS: &[&str] = &["-log", "none", "-pk", "omp", "2", "neigh", "yes", "-sf", "omp"];
/// `-log none -k on t 2 -sf kk`
pub const ACCELERATOR_ARGS: &[&str] = &["-log", "none", "-k", "on", "t", "2", "-sf", "kk"];
/// `-h -log none`
pub const HELP_ARGS: &[&str] = &["-h", "-log", "none"];

/// Capability table with exactly the listed backends available.
pub fn capabilities(available: &[BackendId]) -> CapabilityRegistry {
    CapabilityRegistry::from_entries(
        BackendId::ALL
            .iter()
            .map(|b| CapabilityEntry::new(*b, available.contains(b))),
    )
}

pub fn registries(available: &[BackendId]) -> Registries {
    Registries::new(capabilities(available), StyleRegistry::standard())
}

pub struct Harness {
    pub world: Arc<World>,
    pub screen: SharedBuffer,
    pub console: SharedBuffer,
    pub journal: Arc<LifecycleJournal>,
    pub registries: Registries,
}

impl Harness {
    /// Every backend available.
    pub fn new() -> Self {
        Self::with_registries(Registries::new(
            CapabilityRegistry::all_available(),
            StyleRegistry::standard(),
        ))
    }

    pub fn with_registries(registries: Registries) -> Self {
        Self {
            world: World::new(1, 0).expect("single-rank world"),
            screen: SharedBuffer::new(),
            console: SharedBuffer::new(),
            journal: Arc::new(LifecycleJournal::new()),
            registries,
        }
    }

    pub fn builder(&self, args: &[&str]) -> ContextBuilder {
        let mut argv = vec![EXE];
        argv.extend_from_slice(args);
        Context::builder(argv)
            .registries(self.registries.clone())
            .world(self.world.clone())
            .screen(Channel::buffer(&self.screen))
            .console(Channel::buffer(&self.console))
            .observer(self.journal.clone())
            .build_info(BuildInfo::without_git())
    }

    pub fn build(&self, args: &[&str]) -> Result<Context, ContextError> {
        self.builder(args).build()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A stand-in handle that records its construction sequence number and
/// reports it again when dropped.
pub struct Probe {
    kind: SubsystemKind,
    seq: u64,
    drops: Arc<Mutex<Vec<(SubsystemKind, u64)>>>,
}

impl Subsystem for Probe {
    fn kind(&self) -> SubsystemKind {
        self.kind
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.lock().push((self.kind, self.seq));
    }
}

/// Factories that build [`Probe`]s, numbering them as they are built.
#[derive(Clone, Default)]
pub struct ProbeLog {
    next: Arc<AtomicU64>,
    built: Arc<Mutex<Vec<(SubsystemKind, u64)>>>,
    drops: Arc<Mutex<Vec<(SubsystemKind, u64)>>>,
}

impl ProbeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every slot's factory with a probe factory.
    pub fn install(&self, mut builder: ContextBuilder) -> ContextBuilder {
        for kind in SubsystemKind::CONSTRUCTION_ORDER {
            let log = self.clone();
            builder = builder.factory(
                kind,
                Box::new(move |_scope: &BuildScope<'_>| -> Result<DynSubsystem, SubsystemError> {
                    let seq = log.next.fetch_add(1, Ordering::SeqCst) + 1;
                    log.built.lock().push((kind, seq));
                    Ok(Box::new(Probe {
                        kind,
                        seq,
                        drops: Arc::clone(&log.drops),
                    }))
                }),
            );
        }
        builder
    }

    pub fn built(&self) -> Vec<(SubsystemKind, u64)> {
        self.built.lock().clone()
    }

    pub fn dropped(&self) -> Vec<(SubsystemKind, u64)> {
        self.drops.lock().clone()
    }
}
