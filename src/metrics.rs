/// Metrics and telemetry for Meridian Gateway
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Cache hit/miss rates per tier (ephemeral, durable)
/// - Upstream provider call counts and outcomes
/// - Gateway operation counts
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, Encoder, IntCounterVec, TextEncoder,
};

lazy_static! {
    // ========== Cache Metrics ==========

    /// Cache hits by tier ("ephemeral" or "durable")
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cache_hits_total",
        "Total number of cache hits",
        &["tier"]
    )
    .unwrap();

    /// Cache misses by tier
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cache_misses_total",
        "Total number of cache misses",
        &["tier"]
    )
    .unwrap();

    // ========== Upstream Provider Metrics ==========

    /// Upstream calls by provider ("maps", "weather", "calendar") and outcome
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "upstream_requests_total",
        "Total number of upstream provider requests",
        &["provider", "outcome"]
    )
    .unwrap();

    // ========== Gateway Operation Metrics ==========

    /// Gateway operations by name
    pub static ref GATEWAY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "gateway_operations_total",
        "Total number of gateway operations served",
        &["operation"]
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Record a cache access against a tier
pub fn record_cache_access(tier: &str, hit: bool) {
    if hit {
        CACHE_HITS_TOTAL.with_label_values(&[tier]).inc();
    } else {
        CACHE_MISSES_TOTAL.with_label_values(&[tier]).inc();
    }
}

/// Record an upstream provider call
pub fn record_upstream_request(provider: &str, outcome: &str) {
    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();
}

/// Record a served gateway operation
pub fn record_operation(operation: &str) {
    GATEWAY_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}
