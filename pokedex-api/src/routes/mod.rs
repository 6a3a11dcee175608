//! REST API Routes Module
//!
//! Includes:
//! - Pokemon list, search and mutation routes under /api/pokemon
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for browser-based clients

pub mod health;
pub mod pokemon;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use pokedex_storage::PokedexService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::auth::AuthConfig;
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthMiddlewareState;
use crate::openapi::ApiDoc;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use health::create_router as health_router;
pub use pokemon::create_router as pokemon_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// PRODUCTION VALIDATION
// ============================================================================

/// Validate API configuration for production use.
fn validate_api_config_for_production(config: &ApiConfig) -> ApiResult<()> {
    if config.cors_origins.is_empty() {
        return Err(ApiError::invalid_input(
            "CORS origins not configured for production. Set POKEDEX_CORS_ORIGINS.",
        ));
    }
    if !config.strict_validation {
        tracing::warn!(
            "Strict validation is off: inserts with missing fields answer 200. \
             Set POKEDEX_STRICT_VALIDATION=true once clients handle 400."
        );
    }
    Ok(())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// In development mode (empty origins), allows all origins.
/// In production mode, only allows configured origins.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([HeaderName::from_static(pokemon::SOURCE_HEADER)])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            origins = ?config.cors_origins,
            "CORS: Production mode - allowing configured origins"
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        if config.cors_allow_credentials {
            cors.allow_origin(origins).allow_credentials(true)
        } else {
            cors.allow_origin(origins)
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the complete API router.
///
/// - Pokemon routes under /api/pokemon (mutations behind basic auth)
/// - Health checks at /health/* (public)
/// - Metrics at /metrics (public)
/// - OpenAPI document at /openapi.json
///
/// In production, the auth and CORS configuration is validated first.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. TraceLayer - request/response spans from tower-http
/// 3. Observability - route-labelled metrics and completion logs
/// 4. Basic auth (mutating routes only)
pub fn create_api_router(
    service: Arc<PokedexService>,
    api_config: &ApiConfig,
    auth_config: AuthConfig,
) -> ApiResult<Router> {
    auth_config.validate_for_environment(&api_config.environment)?;
    if api_config.is_production() {
        validate_api_config_for_production(api_config)?;
    }

    let auth_state = AuthMiddlewareState::new(auth_config);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(service.clone());

    let router = Router::new()
        .nest(
            "/api/pokemon",
            pokemon::create_router(service.clone(), api_config.strict_validation, auth_state),
        )
        .nest("/health", health::create_router(service))
        .merge(metrics_routes)
        .route("/openapi.json", get(openapi_json));

    let cors = build_cors_layer(api_config);

    Ok(router
        .layer(from_fn(observability_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
