//! # Simulation Context
//!
//! A [`Context`] owns one simulation's subsystem graph and its lifecycle:
//!
//! ```text
//! Unconfigured -> Activating -> Constructed -> Operational -> TearingDown -> Destroyed
//!                      |                                                       ^
//!                      +---------------- help / aborted start -----------------+
//! ```
//!
//! Activation validates every backend the startup options name before any
//! subsystem exists. Construction follows [`SubsystemKind::CONSTRUCTION_ORDER`]
//! and teardown runs in exact reverse. A Context never tears down the
//! [`World`] it runs on.
//!
//! ```rust,ignore
//! let ctx = Context::new(["atomica", "-log", "none", "-pk", "omp", "2", "-sf", "omp"])?;
//! assert!(ctx.is_operational());
//! let report = ctx.close();
//! ```

mod activation;

pub use activation::{ActiveBackends, Registries};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use at_compute::BackendId;
use at_styles::SuffixState;
use at_telemetry::{
    HistogramTimer, CONFIG_ERRORS, CONSTRUCTION_DURATION, CONTEXTS_CONSTRUCTED, CONTEXTS_LIVE,
};
use shared_types::{LifecycleState, SubsystemKind};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::build_info::BuildInfo;
use crate::config::{InputSource, OutputTarget, StartupConfig, DEFAULT_LOG_FILE};
use crate::container::{
    BuildScope, LifecycleObserver, SubsystemArena, SubsystemFactories, SubsystemFactory,
};
use crate::error::ContextError;
use crate::output::{self, BannerFacts, Channel};
use crate::subsystems::{
    AcceleratorEngine, Allocator, CitationCollector, CommandInput, Communicator, Domain,
    ErrorSink, ForceEngine, GroupManager, Integrator, ModifierRegistry, NeighborManager,
    OutputManager, ParticleContainer, ScriptingBridge, Timer, UniverseView,
};
use crate::universe::{Universe, World, WorldClaim};

/// Outcome of [`Context::close`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    /// Time spent Operational.
    pub elapsed: Duration,
    /// Slots in destruction order.
    pub destroyed: Vec<SubsystemKind>,
    /// Whether this rank wrote the summary line.
    pub summary_written: bool,
}

/// Simulation facade owning the subsystem graph.
pub struct Context {
    id: Uuid,
    state: LifecycleState,
    config: StartupConfig,
    build_info: BuildInfo,
    registries: Registries,
    backends: ActiveBackends,
    universe: Universe,
    arena: SubsystemArena,
    screen: Option<Channel>,
    log: Option<Channel>,
    console: Channel,
    observer: Option<Arc<dyn LifecycleObserver>>,
    operational_since: Option<Instant>,
    claim: Option<WorldClaim>,
}

impl Context {
    /// Build a Context on the process-wide world with this build's
    /// registries, writing to stdout.
    pub fn new<I, S>(args: I) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::builder(args).build()
    }

    pub fn builder<I, S>(args: I) -> ContextBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContextBuilder::new(args.into_iter().map(Into::into).collect())
    }

    fn transition(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("[Context] {} -> {}", self.state, next);
        if let Some(observer) = &self.observer {
            observer.state_changed(self.state, next);
        }
        self.state = next;
    }

    /// Write `text` to the screen and log channels of the root rank.
    fn announce(&self, text: &str) {
        if !self.universe.is_root() {
            return;
        }
        for channel in [self.screen.as_ref(), self.log.as_ref()].into_iter().flatten() {
            if let Err(e) = channel.emit(text) {
                warn!("[Context] Cannot write to {}: {}", channel.label(), e);
            }
        }
    }

    fn banner_facts(&self) -> BannerFacts {
        BannerFacts {
            threads: self.backends.threads.as_ref().map(|t| t.num_threads()),
            accelerator: self.backends.is_active(BackendId::Accelerator),
            suffix: self
                .config
                .suffix
                .is_enabled()
                .then(|| self.config.suffix.to_string()),
            partitions: self.universe.nworlds(),
        }
    }

    fn print_help(&self) {
        let text = output::help(
            &self.build_info,
            &self.config,
            &self.registries.styles,
            &self.registries.modules,
        );
        if let Some(screen) = &self.screen {
            if let Err(e) = screen.emit(&text) {
                warn!("[Context] Cannot write help to {}: {}", screen.label(), e);
            }
        }
    }

    /// Build every slot in construction order.
    fn construct(&mut self, factories: &SubsystemFactories) -> Result<(), ContextError> {
        let _timer = HistogramTimer::new(&CONSTRUCTION_DURATION);
        for kind in SubsystemKind::CONSTRUCTION_ORDER {
            let wanted = match kind {
                SubsystemKind::Citation => self.config.cite,
                SubsystemKind::Accelerator => self.backends.is_active(BackendId::Accelerator),
                _ => true,
            };
            if !wanted {
                debug!("[Context] Skipping optional slot {}", kind);
                continue;
            }

            let handle = {
                let scope = BuildScope::new(
                    &self.config,
                    &self.universe,
                    &self.registries,
                    &self.backends,
                    &self.arena,
                )
                .with_channels(self.screen.as_ref(), self.log.as_ref());
                factories.build(kind, &scope)?
            };
            if handle.kind() != kind {
                return Err(shared_types::SubsystemError::initialization(
                    kind,
                    format!("factory produced a {} handle", handle.kind()),
                )
                .into());
            }
            self.arena.insert(handle)?;

            if kind == SubsystemKind::Accelerator {
                self.announce_accelerator();
            }
        }
        Ok(())
    }

    fn announce_accelerator(&self) {
        let Some(line) = self
            .arena
            .get::<AcceleratorEngine>(SubsystemKind::Accelerator)
            .map(AcceleratorEngine::announcement)
        else {
            return;
        };
        if !self.universe.is_root() {
            return;
        }
        if let Err(e) = self.console.emit(&format!("{line}\n")) {
            warn!("[Context] Cannot write to {}: {}", self.console.label(), e);
        }
    }

    fn teardown(&mut self) -> TeardownReport {
        let was_operational = self.state == LifecycleState::Operational;
        if was_operational {
            self.transition(LifecycleState::TearingDown);
        }
        let elapsed = self
            .operational_since
            .map(|since| since.elapsed())
            .unwrap_or_default();

        let destroyed = self.arena.teardown();

        let summary_written = was_operational && self.universe.is_root();
        if was_operational {
            self.announce(&output::summary(elapsed));
            CONTEXTS_LIVE.dec();
        }
        if !self.state.is_terminal() {
            self.transition(LifecycleState::Destroyed);
        }
        self.claim = None;
        info!(
            "[Context] Context {} destroyed ({} slot(s))",
            self.id,
            destroyed.len()
        );
        TeardownReport {
            elapsed,
            destroyed,
            summary_written,
        }
    }

    /// Tear down the graph in reverse construction order.
    pub fn close(mut self) -> TeardownReport {
        self.teardown()
    }

    // ------------------------------------------------------------------
    // Facade
    // ------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_operational(&self) -> bool {
        self.state == LifecycleState::Operational
    }

    pub fn config(&self) -> &StartupConfig {
        &self.config
    }

    pub fn world(&self) -> &Arc<World> {
        self.universe.world()
    }

    pub fn execution_universe(&self) -> &Universe {
        &self.universe
    }

    pub fn input_source(&self) -> &InputSource {
        &self.config.input
    }

    pub fn has_screen(&self) -> bool {
        self.screen.is_some()
    }

    pub fn has_logfile(&self) -> bool {
        self.log.is_some()
    }

    /// When the Context became Operational.
    pub fn init_clock(&self) -> Option<Instant> {
        self.operational_since
    }

    pub fn suffix(&self) -> &SuffixState {
        &self.config.suffix
    }

    pub fn exe_name(&self) -> &str {
        &self.config.exe_name
    }

    pub fn num_package(&self) -> usize {
        self.config.num_package()
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build_info
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn backends(&self) -> &ActiveBackends {
        &self.backends
    }

    pub fn is_installed_module(&self, module: &str) -> bool {
        self.registries.modules.is_installed(module)
    }

    /// Slot sequence numbers and handle descriptions.
    pub fn snapshot(&self) -> serde_json::Value {
        self.arena.snapshot()
    }

    pub fn contains(&self, kind: SubsystemKind) -> bool {
        self.arena.contains(kind)
    }

    pub fn constructed(&self) -> Vec<SubsystemKind> {
        self.arena.kinds().collect()
    }

    pub fn memory(&self) -> Option<&Allocator> {
        self.arena.get(SubsystemKind::Memory)
    }

    /// The allocator, if it is the accelerator-aware variant.
    pub fn memory_accel(&self) -> Option<&Allocator> {
        self.memory().filter(|m| m.is_accelerated())
    }

    pub fn error(&self) -> Option<&ErrorSink> {
        self.arena.get(SubsystemKind::Error)
    }

    pub fn universe(&self) -> Option<&UniverseView> {
        self.arena.get(SubsystemKind::Universe)
    }

    pub fn input(&self) -> Option<&CommandInput> {
        self.arena.get(SubsystemKind::Input)
    }

    pub fn citations(&self) -> Option<&CitationCollector> {
        self.arena.get(SubsystemKind::Citation)
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.arena.get(SubsystemKind::Domain)
    }

    pub fn atom(&self) -> Option<&ParticleContainer> {
        self.arena.get(SubsystemKind::Atom)
    }

    /// The particle container, if it is the accelerator-aware variant.
    pub fn atom_accel(&self) -> Option<&ParticleContainer> {
        self.atom().filter(|a| a.is_accelerated())
    }

    pub fn neighbor(&self) -> Option<&NeighborManager> {
        self.arena.get(SubsystemKind::Neighbor)
    }

    pub fn comm(&self) -> Option<&Communicator> {
        self.arena.get(SubsystemKind::Comm)
    }

    pub fn force(&self) -> Option<&ForceEngine> {
        self.arena.get(SubsystemKind::Force)
    }

    pub fn update(&self) -> Option<&Integrator> {
        self.arena.get(SubsystemKind::Update)
    }

    pub fn modify(&self) -> Option<&ModifierRegistry> {
        self.arena.get(SubsystemKind::Modify)
    }

    pub fn group(&self) -> Option<&GroupManager> {
        self.arena.get(SubsystemKind::Group)
    }

    pub fn output(&self) -> Option<&OutputManager> {
        self.arena.get(SubsystemKind::Output)
    }

    pub fn timer(&self) -> Option<&Timer> {
        self.arena.get(SubsystemKind::Timer)
    }

    pub fn accelerator(&self) -> Option<&AcceleratorEngine> {
        self.arena.get(SubsystemKind::Accelerator)
    }

    pub fn python(&self) -> Option<&ScriptingBridge> {
        self.arena.get(SubsystemKind::Python)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            self.teardown();
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("slots", &self.arena)
            .finish()
    }
}

/// Configures and builds a [`Context`].
pub struct ContextBuilder {
    args: Vec<String>,
    registries: Option<Registries>,
    world: Option<Arc<World>>,
    screen: Option<Channel>,
    log: Option<Channel>,
    console: Option<Channel>,
    observer: Option<Arc<dyn LifecycleObserver>>,
    factories: SubsystemFactories,
    build_info: Option<BuildInfo>,
}

impl ContextBuilder {
    fn new(args: Vec<String>) -> Self {
        Self {
            args,
            registries: None,
            world: None,
            screen: None,
            log: None,
            console: None,
            observer: None,
            factories: SubsystemFactories::standard(),
            build_info: None,
        }
    }

    pub fn registries(mut self, registries: Registries) -> Self {
        self.registries = Some(registries);
        self
    }

    pub fn world(mut self, world: Arc<World>) -> Self {
        self.world = Some(world);
        self
    }

    /// Screen sink used unless the options say `-screen none`.
    pub fn screen(mut self, channel: Channel) -> Self {
        self.screen = Some(channel);
        self
    }

    /// Log sink used unless the options say `-log none`.
    pub fn log(mut self, channel: Channel) -> Self {
        self.log = Some(channel);
        self
    }

    /// Sink for backend announcements; stdout by default.
    pub fn console(mut self, channel: Channel) -> Self {
        self.console = Some(channel);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn factory(mut self, kind: SubsystemKind, factory: SubsystemFactory) -> Self {
        self.factories = self.factories.with(kind, factory);
        self
    }

    pub fn build_info(mut self, info: BuildInfo) -> Self {
        self.build_info = Some(info);
        self
    }

    #[instrument(name = "context_build", skip(self))]
    pub fn build(self) -> Result<Context, ContextError> {
        let result = self.build_inner();
        if let Err(e) = &result {
            CONFIG_ERRORS.with_label_values(&[e.class().as_str()]).inc();
            error!("[Context] Startup failed: {}", e);
        }
        result
    }

    fn build_inner(self) -> Result<Context, ContextError> {
        let ContextBuilder {
            args,
            registries,
            world,
            screen,
            log,
            console,
            observer,
            factories,
            build_info,
        } = self;

        if let Some(observer) = &observer {
            observer.state_changed(LifecycleState::Unconfigured, LifecycleState::Activating);
        }
        let activated = match Activated::new(args, registries, world, screen, log) {
            Ok(activated) => activated,
            Err(e) => {
                if let Some(observer) = &observer {
                    observer.state_changed(LifecycleState::Activating, LifecycleState::Destroyed);
                }
                return Err(e);
            }
        };

        let mut context = Context {
            id: activated.id,
            state: LifecycleState::Activating,
            config: activated.config,
            build_info: build_info.unwrap_or_else(BuildInfo::current),
            registries: activated.registries,
            backends: activated.backends,
            universe: activated.universe,
            arena: SubsystemArena::new(observer.clone()),
            screen: activated.screen,
            log: activated.log,
            console: console.unwrap_or_else(Channel::stdout),
            observer,
            operational_since: None,
            claim: Some(activated.claim),
        };

        if context.config.help {
            info!("[Context] Help requested; no subsystems will be built");
            context.print_help();
            return Ok(context);
        }

        let banner = output::banner(&context.build_info, &context.banner_facts());
        context.announce(&banner);

        context.construct(&factories)?;
        context.transition(LifecycleState::Constructed);

        context.operational_since = Some(Instant::now());
        context.transition(LifecycleState::Operational);
        CONTEXTS_CONSTRUCTED.inc();
        CONTEXTS_LIVE.inc();
        info!(
            "[Context] Context {} operational with {} slot(s)",
            context.id,
            context.arena.len()
        );
        Ok(context)
    }
}

/// Everything settled while Activating, before any subsystem exists.
struct Activated {
    id: Uuid,
    config: StartupConfig,
    registries: Registries,
    backends: ActiveBackends,
    universe: Universe,
    claim: WorldClaim,
    screen: Option<Channel>,
    log: Option<Channel>,
}

impl Activated {
    fn new(
        args: Vec<String>,
        registries: Option<Registries>,
        world: Option<Arc<World>>,
        screen: Option<Channel>,
        log: Option<Channel>,
    ) -> Result<Self, ContextError> {
        let config = StartupConfig::parse(args)?;
        let registries = registries.unwrap_or_else(Registries::bootstrap);
        let world = world.unwrap_or_else(World::global);

        let backends = activation::activate(&config, &registries.capabilities, &world)?;
        let universe = Universe::new(world, &config.partitions)?;

        let id = Uuid::new_v4();
        let claim = universe.world().claim(id)?;

        // Only the root rank writes; help mode writes to the screen only.
        let root = universe.is_root();
        let screen = if root {
            open_channel(&config.screen, screen, "screen", || Ok(Channel::stdout()))?
        } else {
            None
        };
        let log = if root && !config.help {
            open_channel(&config.log, log, "log file", || {
                Channel::create(Path::new(DEFAULT_LOG_FILE)).map_err(|source| ContextError::Io {
                    what: "log file",
                    path: PathBuf::from(DEFAULT_LOG_FILE),
                    source,
                })
            })?
        } else {
            None
        };

        Ok(Self {
            id,
            config,
            registries,
            backends,
            universe,
            claim,
            screen,
            log,
        })
    }
}

/// Resolve an output target: `none` suppresses the channel, an injected
/// channel replaces any other target, a path is created, and the default
/// comes from `default`.
fn open_channel<F>(
    target: &OutputTarget,
    injected: Option<Channel>,
    what: &'static str,
    default: F,
) -> Result<Option<Channel>, ContextError>
where
    F: FnOnce() -> Result<Channel, ContextError>,
{
    match (target, injected) {
        (OutputTarget::None, _) => Ok(None),
        (_, Some(channel)) => Ok(Some(channel)),
        (OutputTarget::Path(path), None) => Channel::create(path)
            .map(Some)
            .map_err(|source| ContextError::Io {
                what,
                path: path.clone(),
                source,
            }),
        (OutputTarget::Default, None) => default().map(Some),
    }
}
