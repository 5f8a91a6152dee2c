/// Prometheus metrics for the issue management service.
///
/// Covers report ingestion, classification outcomes, and realtime event
/// delivery. Metrics are registered once via [`init_metrics`] and exposed in
/// text exposition format through [`gather_metrics`] at `GET /metrics`.

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total reports submitted, by category
    pub static ref REPORTS_SUBMITTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("reports_submitted_total", "Total number of issue reports submitted")
            .namespace("civic_issue_manager"),
        &["category"]
    ).expect("Failed to create REPORTS_SUBMITTED_TOTAL metric");

    /// Classification outcomes, by path taken
    ///
    /// Labels: outcome (keyword_scoring | uniform_random | fallback | degraded)
    pub static ref CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("classifications_total", "Classification pipeline outcomes")
            .namespace("civic_issue_manager"),
        &["outcome"]
    ).expect("Failed to create CLASSIFICATIONS_TOTAL metric");

    /// Classification pipeline duration in seconds
    pub static ref CLASSIFICATION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "classification_duration_seconds",
            "Classification pipeline duration in seconds"
        )
        .namespace("civic_issue_manager")
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
    ).expect("Failed to create CLASSIFICATION_DURATION_SECONDS metric");

    /// Results flagged for manual review (confidence below threshold)
    pub static ref LOW_CONFIDENCE_TOTAL: Counter = Counter::with_opts(
        Opts::new("low_confidence_total", "Classification results flagged for manual review")
            .namespace("civic_issue_manager")
    ).expect("Failed to create LOW_CONFIDENCE_TOTAL metric");

    /// Realtime events published, by event type
    pub static ref EVENTS_PUBLISHED_TOTAL: CounterVec = CounterVec::new(
        Opts::new("events_published_total", "Realtime events published")
            .namespace("civic_issue_manager"),
        &["event_type"]
    ).expect("Failed to create EVENTS_PUBLISHED_TOTAL metric");

    /// Issue status transitions, by target status
    pub static ref STATUS_TRANSITIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("status_transitions_total", "Issue status transitions")
            .namespace("civic_issue_manager"),
        &["status"]
    ).expect("Failed to create STATUS_TRANSITIONS_TOTAL metric");
}

/// Register all metrics with the global registry.
///
/// Call once at startup. Re-registration errors are surfaced so a double
/// init is visible in logs rather than silently ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(REPORTS_SUBMITTED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CLASSIFICATIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CLASSIFICATION_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(LOW_CONFIDENCE_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(EVENTS_PUBLISHED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(STATUS_TRANSITIONS_TOTAL.clone()))?;
    Ok(())
}

/// Export all metrics in Prometheus text exposition format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode metrics");
            String::new()
        })
}
