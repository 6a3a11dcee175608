//! Prometheus Metrics Definitions
//!
//! Defines the service metrics and the /metrics endpoint for Prometheus
//! scraping. Cache counters live in the storage crate and are copied into
//! gauges at scrape time.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use pokedex_storage::{CacheMode, CacheStats, PokedexService, ReadSource};
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram_vec, CounterVec, Encoder,
    GaugeVec, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<PokedexMetrics>> = Lazy::new(PokedexMetrics::new);

/// Container for all Pokedex metrics.
#[derive(Clone)]
pub struct PokedexMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Collection reads by where they were answered - labels: source (cache/store)
    pub collection_reads_total: CounterVec,

    /// Record writes - labels: operation, status
    pub writes_total: CounterVec,

    /// Cache adapter counters, mirrored at scrape time - labels: outcome
    pub cache_events: GaugeVec,

    /// Current cache mode, one series per mode set to 0 or 1 - labels: mode
    pub cache_mode: GaugeVec,
}

impl PokedexMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "pokedex_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "pokedex_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            collection_reads_total: register_counter_vec!(
                "pokedex_collection_reads_total",
                "Collection reads by the layer that answered them",
                &["source"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register collection_reads_total: {}", e)))?,

            writes_total: register_counter_vec!(
                "pokedex_writes_total",
                "Record store mutations",
                &["operation", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register writes_total: {}", e)))?,

            cache_events: register_gauge_vec!(
                "pokedex_cache_events",
                "Cache adapter event counts since startup",
                &["outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_events: {}", e)))?,

            cache_mode: register_gauge_vec!(
                "pokedex_cache_mode",
                "Cache adapter mode (1 for the active mode)",
                &["mode"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register cache_mode: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, status_str.as_str()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record where a collection read was answered. Store reads are cache fallbacks.
    pub fn record_collection_read(&self, source: ReadSource) {
        self.collection_reads_total
            .with_label_values(&[source.as_str()])
            .inc();
    }

    /// Record a mutation attempt.
    pub fn record_write(&self, operation: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.writes_total
            .with_label_values(&[operation, status])
            .inc();
    }

    /// Mirror the cache adapter's counters and mode into gauges.
    pub fn observe_cache(&self, stats: &CacheStats, mode: CacheMode) {
        for (outcome, value) in [
            ("hit", stats.hits),
            ("miss", stats.misses),
            ("timeout", stats.timeouts),
            ("error", stats.errors),
            ("write", stats.writes),
            ("write_failure", stats.write_failures),
            ("refresh_failure", stats.refresh_failures),
        ] {
            self.cache_events
                .with_label_values(&[outcome])
                .set(value as f64);
        }

        for candidate in [CacheMode::Disabled, CacheMode::Connected, CacheMode::Degraded] {
            let active = if candidate == mode { 1.0 } else { 0.0 };
            self.cache_mode
                .with_label_values(&[candidate.as_str()])
                .set(active);
        }
    }
}

/// Run `f` against the global metrics, if they registered.
pub fn with_metrics(f: impl FnOnce(&PokedexMetrics)) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler(State(service): State<Arc<PokedexService>>) -> impl IntoResponse {
    with_metrics(|m| m.observe_cache(&service.cache_stats(), service.cache_mode()));

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
