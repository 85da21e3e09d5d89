//! Prometheus metrics collection for imbot-ng.
//!
//! Exposed on an optional HTTP endpoint (see [`crate::http`]).
//!
//! - `imbot_command_total{command}` - Commands executed by name
//! - `imbot_command_duration_seconds{command}` - Command latency histogram
//! - `imbot_command_errors_total{command, error}` - Rejections and failures by kind
//! - `imbot_events_total{kind}` - Gateway events received
//! - `imbot_pagination_sessions` - Live pagination sessions (gauge)
//! - `imbot_cache_loads_total{cache, result}` - Scoped cache loads

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Commands executed by name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by name and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Gateway events received by kind.
pub static EVENTS_RECEIVED: OnceLock<IntCounterVec> = OnceLock::new();

/// Scoped cache loads by cache name and result.
pub static CACHE_LOADS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms and gauges
// ========================================================================

/// Command latency by name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Live pagination sessions.
pub static PAGINATION_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded. Until
/// then every recording helper is a no-op.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("imbot_command_total", "Commands executed by name"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("imbot_command_errors_total", "Command errors by name and kind"), &["command", "error"]));
    register!(EVENTS_RECEIVED, IntCounterVec::new(Opts::new("imbot_events_total", "Gateway events received"), &["kind"]));
    register!(CACHE_LOADS, IntCounterVec::new(Opts::new("imbot_cache_loads_total", "Scoped cache loads"), &["cache", "result"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("imbot_command_duration_seconds", "Command latency by name")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["command"]));
    register!(PAGINATION_SESSIONS, IntGauge::new("imbot_pagination_sessions", "Live pagination sessions"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command rejection or failure.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
pub fn record_event(kind: &str) {
    if let Some(c) = EVENTS_RECEIVED.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[inline]
pub fn record_cache_load(cache: &str, ok: bool) {
    if let Some(c) = CACHE_LOADS.get() {
        c.with_label_values(&[cache, if ok { "ok" } else { "error" }])
            .inc();
    }
}

#[inline]
pub fn set_pagination_sessions(count: usize) {
    if let Some(g) = PAGINATION_SESSIONS.get() {
        g.set(count as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();

        record_command("ranks", 0.001);
        record_command_error("warn", "insufficient_permission");
        set_pagination_sessions(2);

        let output = gather_metrics();
        assert!(output.contains("imbot_command_total"));
        assert!(output.contains("imbot_command_errors_total"));
        assert!(output.contains("imbot_pagination_sessions 2"));
    }
}
