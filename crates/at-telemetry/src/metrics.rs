//! Prometheus metrics for the simulation context.
//!
//! All metrics follow the naming convention: `atomica_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CONTEXT LIFECYCLE
    // =========================================================================

    /// Contexts that reached Operational
    pub static ref CONTEXTS_CONSTRUCTED: Counter = Counter::new(
        "atomica_context_constructed_total",
        "Total number of contexts that reached the operational state"
    ).expect("metric creation failed");

    /// Contexts currently alive
    pub static ref CONTEXTS_LIVE: Gauge = Gauge::new(
        "atomica_context_live",
        "Number of contexts currently operational"
    ).expect("metric creation failed");

    /// Graph construction duration
    pub static ref CONSTRUCTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "atomica_context_construction_duration_seconds",
            "Time spent building the subsystem graph"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("bucket layout"))
    ).expect("metric creation failed");

    /// Fatal configuration errors by class
    pub static ref CONFIG_ERRORS: CounterVec = CounterVec::new(
        Opts::new("atomica_context_errors_total", "Fatal context errors"),
        &["class"]  // configuration / capability_mismatch / unresolvable_style
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSYSTEM GRAPH
    // =========================================================================

    pub static ref SUBSYSTEMS_CONSTRUCTED: CounterVec = CounterVec::new(
        Opts::new("atomica_subsystem_constructed_total", "Subsystem handles constructed"),
        &["subsystem"]
    ).expect("metric creation failed");

    pub static ref SUBSYSTEMS_DESTROYED: CounterVec = CounterVec::new(
        Opts::new("atomica_subsystem_destroyed_total", "Subsystem handles destroyed"),
        &["subsystem"]
    ).expect("metric creation failed");

    // =========================================================================
    // STYLES
    // =========================================================================

    /// Style resolutions by category and serving tier
    pub static ref STYLE_RESOLUTIONS: CounterVec = CounterVec::new(
        Opts::new("atomica_style_resolutions_total", "Style names resolved"),
        &["category", "outcome"]  // outcome: primary / secondary / base
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register every metric with [`REGISTRY`]. Fails when called twice.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(CONTEXTS_CONSTRUCTED.clone()),
        Box::new(CONTEXTS_LIVE.clone()),
        Box::new(CONSTRUCTION_DURATION.clone()),
        Box::new(CONFIG_ERRORS.clone()),
        Box::new(SUBSYSTEMS_CONSTRUCTED.clone()),
        Box::new(SUBSYSTEMS_DESTROYED.clone()),
        Box::new(STYLE_RESOLUTIONS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
