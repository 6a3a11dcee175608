//! Health Check Endpoints
//!
//! Provides Kubernetes-compatible health check endpoints:
//! - /health/ping - Simple liveness check
//! - /health/ready - Record store readability and cache mode
//! - /health/live - Process alive check
//!
//! No authentication required for health endpoints. A degraded cache makes
//! the service slower, not unavailable, so readiness stays 200.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use pokedex_storage::{CacheMode, PokedexService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline for the readiness cache ping.
const CACHE_PING_DEADLINE: Duration = Duration::from_millis(500);

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub store: ComponentHealth,
    pub cache: ComponentHealth,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Cache mode (`disabled`, `connected`, `degraded`); absent for the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Number of records, for the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            mode: None,
            records: None,
            error: None,
        }
    }

    fn failing(status: HealthStatus, error: String) -> Self {
        Self {
            status,
            latency_ms: None,
            mode: None,
            records: None,
            error: Some(error),
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone)]
pub struct HealthState {
    pub service: Arc<PokedexService>,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(service: Arc<PokedexService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check (store readable, cache reachable)
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready, possibly with a degraded cache", body = HealthResponse),
        (status = 503, description = "Record store is unreadable", body = HealthResponse),
    ),
)]
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let store = check_store(&state.service).await;
    let cache = check_cache(&state.service).await;

    let overall_status = overall_status(&store, &cache);

    let response = HealthResponse {
        status: overall_status,
        message: None,
        details: Some(HealthDetails {
            store,
            cache,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if overall_status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

fn overall_status(store: &ComponentHealth, cache: &ComponentHealth) -> HealthStatus {
    match (store.status, cache.status) {
        (HealthStatus::Unhealthy, _) => HealthStatus::Unhealthy,
        (_, HealthStatus::Healthy) => HealthStatus::Healthy,
        _ => HealthStatus::Degraded,
    }
}

async fn check_store(service: &PokedexService) -> ComponentHealth {
    let start = Instant::now();

    match service.check_store().await {
        Ok(count) => ComponentHealth {
            records: Some(count),
            ..ComponentHealth::healthy(start.elapsed().as_millis() as u64)
        },
        Err(e) => {
            tracing::error!(error = %e, "Readiness: record store check failed");
            ComponentHealth::failing(HealthStatus::Unhealthy, "record store unreadable".to_string())
        }
    }
}

async fn check_cache(service: &PokedexService) -> ComponentHealth {
    let mode = service.cache_mode();
    let start = Instant::now();

    let mut health = match mode {
        CacheMode::Disabled => ComponentHealth {
            latency_ms: None,
            ..ComponentHealth::healthy(0)
        },
        CacheMode::Connected | CacheMode::Degraded => {
            match service.cache().ping(CACHE_PING_DEADLINE).await {
                Ok(()) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
                Err(e) => {
                    tracing::warn!(error = %e, mode = %mode, "Readiness: cache ping failed");
                    ComponentHealth::failing(HealthStatus::Degraded, e.to_string())
                }
            }
        }
    };
    health.mode = Some(mode.as_str().to_string());
    health
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router (no auth required)
pub fn create_router(service: Arc<PokedexService>) -> Router {
    let state = Arc::new(HealthState::new(service));

    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}
