//! Prometheus metrics for milestone-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    upstream_latency_seconds: HistogramVec,
    upstream_errors_total: IntCounterVec,
    tokens_total: IntCounterVec,
    validation_warnings_total: IntCounterVec,
}

impl Metrics {
    fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "milestone_requests_total",
                "Total milestone generation requests by outcome",
            ),
            &["outcome"],
        )?;

        let upstream_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "milestone_upstream_latency_seconds",
                "Generative API latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["provider", "model"],
        )?;

        let upstream_errors_total = IntCounterVec::new(
            Opts::new(
                "milestone_upstream_errors_total",
                "Total generative API errors",
            ),
            &["provider", "error_type"],
        )?;

        // type: input, output
        let tokens_total = IntCounterVec::new(
            Opts::new("milestone_tokens_total", "Total tokens processed"),
            &["model", "type"],
        )?;

        let validation_warnings_total = IntCounterVec::new(
            Opts::new(
                "milestone_validation_warnings_total",
                "Generated milestone sets that deviate from the expected shape",
            ),
            &["kind"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(upstream_latency_seconds.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;
        registry.register(Box::new(tokens_total.clone()))?;
        registry.register(Box::new(validation_warnings_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            upstream_latency_seconds,
            upstream_errors_total,
            tokens_total,
            validation_warnings_total,
        })
    }
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = Metrics::new()?;
    let _ = METRICS.set(metrics);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let metrics = match METRICS.get() {
        Some(m) => m,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics

/// Record the outcome of a request to the generate endpoint.
pub fn record_request(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.requests_total.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_upstream_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.upstream_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_upstream_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.upstream_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record token usage reported by the provider.
pub fn record_tokens(model: &str, input_tokens: i32, output_tokens: i32) {
    if let Some(m) = METRICS.get() {
        m.tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(input_tokens.max(0) as u64);
        m.tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(output_tokens.max(0) as u64);
    }
}

/// Record a deviation found by advisory milestone validation.
pub fn record_validation_warning(kind: &str) {
    if let Some(m) = METRICS.get() {
        m.validation_warnings_total.with_label_values(&[kind]).inc();
    }
}
