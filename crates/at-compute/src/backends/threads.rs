//! Thread-parallel backend using Rayon
//!
//! Configured by the `omp` package preload:
//!
//! ```text
//! -pk omp <nthreads> [neigh yes|no]
//! ```
//!
//! `nthreads == 0` asks for one worker per logical CPU.

use rayon::ThreadPool;
use tracing::info;

use crate::{parse_count, BackendId, ComputeError};

const BACKEND: BackendId = BackendId::ThreadParallel;

/// Runtime parameters of the thread-parallel backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadSettings {
    /// Worker count as requested (0 = all logical CPUs).
    pub requested: usize,
    /// Build neighbor lists with threads as well.
    pub neigh_threaded: bool,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            requested: 1,
            neigh_threaded: true,
        }
    }
}

impl ThreadSettings {
    /// Parse the arguments that follow `omp` in a package directive.
    pub fn from_package_args(args: &[String]) -> Result<Self, ComputeError> {
        let mut iter = args.iter();
        let requested = parse_count(BACKEND, "nthreads", iter.next())?;
        let mut settings = Self {
            requested,
            ..Self::default()
        };

        while let Some(keyword) = iter.next() {
            match keyword.as_str() {
                "neigh" => {
                    settings.neigh_threaded = parse_yes_no(keyword, iter.next())?;
                }
                other => {
                    return Err(ComputeError::invalid(
                        BACKEND,
                        format!("unknown package omp keyword '{other}'"),
                    ))
                }
            }
        }
        Ok(settings)
    }

    /// Settings for a backend activated only through the `omp` suffix.
    ///
    /// Reads `OMP_NUM_THREADS`, falling back to a single worker.
    pub fn from_env() -> Self {
        let requested = std::env::var("OMP_NUM_THREADS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Worker count after expanding the `0` shorthand.
    pub fn resolved_threads(&self) -> usize {
        if self.requested == 0 {
            num_cpus::get().max(1)
        } else {
            self.requested
        }
    }
}

fn parse_yes_no(keyword: &str, value: Option<&String>) -> Result<bool, ComputeError> {
    match value.map(String::as_str) {
        Some("yes") => Ok(true),
        Some("no") => Ok(false),
        Some(other) => Err(ComputeError::invalid(
            BACKEND,
            format!("'{keyword}' expects yes or no, got '{other}'"),
        )),
        None => Err(ComputeError::invalid(
            BACKEND,
            format!("'{keyword}' needs a value"),
        )),
    }
}

/// A dedicated worker pool for data-parallel fan-out inside subsystem
/// operations. Never used while the subsystem graph is built or torn down.
pub struct ThreadParallelEngine {
    settings: ThreadSettings,
    pool: ThreadPool,
}

impl ThreadParallelEngine {
    pub fn new(settings: ThreadSettings) -> Result<Self, ComputeError> {
        let threads = settings.resolved_threads();
        let pool = super::build_pool("atomica-omp", threads)?;
        info!(
            "[Compute] Thread-parallel backend: {} thread(s), threaded neighbor lists: {}",
            threads, settings.neigh_threaded
        );
        Ok(Self { settings, pool })
    }

    pub fn settings(&self) -> &ThreadSettings {
        &self.settings
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the pool; Rayon parallel iterators used by `op` fan
    /// out over this pool's workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }
}

impl std::fmt::Debug for ThreadParallelEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadParallelEngine")
            .field("settings", &self.settings)
            .field("threads", &self.num_threads())
            .finish()
    }
}
