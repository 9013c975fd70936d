//! Execution engines brought up by activated backends.
//!
//! Both engines always compile; whether configuration may activate them is
//! decided by the [`CapabilityRegistry`](crate::CapabilityRegistry).

pub mod accelerator;
pub mod threads;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::ComputeError;

/// Build a named Rayon pool with `threads` workers.
pub(crate) fn build_pool(prefix: &'static str, threads: usize) -> Result<ThreadPool, ComputeError> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("{prefix}-{i}"))
        .build()
        .map_err(|e| ComputeError::InitializationFailed(e.to_string()))
}
