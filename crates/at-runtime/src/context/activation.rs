//! Backend activation: every startup option that names a backend is checked
//! against the capability table here, before any subsystem exists.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use at_compute::{
    AcceleratorSettings, BackendId, CapabilityRegistry, ThreadParallelEngine, ThreadSettings,
};
use at_styles::{ModuleSet, StyleRegistry, SuffixState};
use tracing::{debug, info};

use crate::config::StartupConfig;
use crate::error::{ConfigError, ContextError};
use crate::universe::World;

/// Suffix of the accelerator-aware core variants (`memory/kk`, `atom/kk`).
const ACCELERATOR_SUFFIX: &str = "kk";

/// The immutable tables a Context consults.
#[derive(Debug, Clone)]
pub struct Registries {
    pub capabilities: Arc<CapabilityRegistry>,
    pub styles: Arc<StyleRegistry>,
    pub modules: ModuleSet,
}

static BOOTSTRAP: OnceLock<Registries> = OnceLock::new();

impl Registries {
    /// This build's capabilities, the standard style table, and the modules
    /// the build installs.
    pub fn bootstrap() -> Self {
        BOOTSTRAP
            .get_or_init(|| {
                Self::new(
                    CapabilityRegistry::bootstrap().clone(),
                    StyleRegistry::bootstrap().clone(),
                )
            })
            .clone()
    }

    /// Modules are derived from `capabilities`.
    pub fn new(capabilities: CapabilityRegistry, styles: StyleRegistry) -> Self {
        let modules = ModuleSet::for_build(&capabilities);
        Self {
            capabilities: Arc::new(capabilities),
            styles: Arc::new(styles),
            modules,
        }
    }

    pub fn with_modules(mut self, modules: ModuleSet) -> Self {
        self.modules = modules;
        self
    }
}

/// Backends switched on for one Context.
#[derive(Debug, Default)]
pub struct ActiveBackends {
    pub threads: Option<ThreadParallelEngine>,
    pub accelerator: Option<AcceleratorSettings>,
    /// Keyword/value pairs of `-pk kk`.
    pub accelerator_package: BTreeMap<String, String>,
    pub distributed: bool,
    /// Enabled only while the accelerator is active.
    pub core_suffix: SuffixState,
}

impl ActiveBackends {
    pub fn is_active(&self, backend: BackendId) -> bool {
        match backend {
            BackendId::ThreadParallel => self.threads.is_some(),
            BackendId::DistributedRank => self.distributed,
            BackendId::Accelerator => self.accelerator.is_some(),
        }
    }
}

/// Validate the requested backends and switch them on.
pub(crate) fn activate(
    config: &StartupConfig,
    capabilities: &CapabilityRegistry,
    world: &World,
) -> Result<ActiveBackends, ContextError> {
    let accelerator = match &config.accelerator {
        Some(args) => {
            if !capabilities.is_available(BackendId::Accelerator) {
                return Err(ContextError::mismatch(BackendId::Accelerator, "-kokkos on"));
            }
            Some(AcceleratorSettings::from_args(args)?)
        }
        None => None,
    };

    let mut wants_threads = false;
    for suffix in config.suffix.suffixes() {
        match BackendId::from_suffix(suffix) {
            Some(BackendId::Accelerator) => {
                require_accelerator(capabilities, accelerator.is_some(), &format!("-suffix {suffix}"))?
            }
            Some(BackendId::ThreadParallel) => {
                if !capabilities.is_available(BackendId::ThreadParallel) {
                    return Err(ContextError::mismatch(
                        BackendId::ThreadParallel,
                        format!("-suffix {suffix}"),
                    ));
                }
                wants_threads = true;
            }
            _ => debug!("[Activation] Suffix '{}' selects no backend", suffix),
        }
    }

    let mut thread_settings = None;
    let mut accelerator_package = BTreeMap::new();
    for package in &config.packages {
        match BackendId::from_suffix(&package.style) {
            Some(BackendId::ThreadParallel) => {
                if !capabilities.is_available(BackendId::ThreadParallel) {
                    return Err(ContextError::mismatch(
                        BackendId::ThreadParallel,
                        format!("-package {}", package.style),
                    ));
                }
                thread_settings = Some(ThreadSettings::from_package_args(&package.args)?);
            }
            Some(BackendId::Accelerator) => {
                let option = format!("-package {}", package.style);
                require_accelerator(capabilities, accelerator.is_some(), &option)?;
                accelerator_package.extend(keyword_pairs(&option, &package.args)?);
            }
            _ => return Err(ContextError::UnknownPackage(package.style.clone())),
        }
    }

    if world.size() > 1 && !capabilities.is_available(BackendId::DistributedRank) {
        return Err(ContextError::mismatch(
            BackendId::DistributedRank,
            format!("a world of {} ranks", world.size()),
        ));
    }

    let settings = thread_settings.or_else(|| wants_threads.then(ThreadSettings::from_env));
    let threads = settings.map(ThreadParallelEngine::new).transpose()?;

    let core_suffix = if accelerator.is_some() {
        SuffixState::single(ACCELERATOR_SUFFIX).map_err(ConfigError::from)?
    } else {
        SuffixState::disabled()
    };

    let backends = ActiveBackends {
        threads,
        accelerator,
        accelerator_package,
        distributed: world.size() > 1,
        core_suffix,
    };
    info!(
        "[Activation] Active backends: {}",
        BackendId::ALL
            .iter()
            .filter(|b| backends.is_active(**b))
            .map(BackendId::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(backends)
}

/// A `kk` option needs the accelerator turned on with `-kokkos on`.
fn require_accelerator(
    capabilities: &CapabilityRegistry,
    active: bool,
    option: &str,
) -> Result<(), ContextError> {
    if active {
        Ok(())
    } else if !capabilities.is_available(BackendId::Accelerator) {
        Err(ContextError::mismatch(BackendId::Accelerator, option))
    } else {
        Err(ContextError::Conflict(format!(
            "{option} requires the accelerator to be enabled with -kokkos on"
        )))
    }
}

fn keyword_pairs(option: &str, args: &[String]) -> Result<Vec<(String, String)>, ConfigError> {
    if args.len() % 2 != 0 {
        return Err(ConfigError::InvalidValue {
            option: option.to_string(),
            value: args.join(" "),
            expected: "keyword/value pairs",
        });
    }
    Ok(args
        .chunks(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect())
}
