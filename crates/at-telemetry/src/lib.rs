//! # Atomica Telemetry
//!
//! Structured logging and process metrics.
//!
//! Log output goes to stderr. Stdout belongs to the simulation's screen
//! channel, whose banner and summary lines are greppable by tooling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use at_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ATOMICA_LOG_LEVEL` / `RUST_LOG` | `warn` | Log level filter |
//! | `ATOMICA_JSON_LOGS` | `false` | JSON formatted logs |
//! | `ATOMICA_CONSOLE_OUTPUT` | `true` | Emit logs at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, CONFIG_ERRORS,
    CONSTRUCTION_DURATION, CONTEXTS_CONSTRUCTED, CONTEXTS_LIVE, STYLE_RESOLUTIONS,
    SUBSYSTEMS_CONSTRUCTED, SUBSYSTEMS_DESTROYED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Install logging and register metrics.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(&config)?;
    Ok(TelemetryGuard { _metrics: metrics })
}

/// Keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Shutting down telemetry");
    }
}
