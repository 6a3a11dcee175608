//! Pokedex API Server Entry Point
//!
//! Bootstraps configuration, connects the cache, opens the JSON record store
//! and starts the Axum HTTP server.

use std::sync::Arc;

use axum::Router;
use pokedex_api::telemetry::{init_tracing, TelemetryConfig};
use pokedex_api::{create_api_router, ApiConfig, ApiError, ApiResult, AuthConfig};
use pokedex_storage::{CacheAdapter, CacheConfig, JsonFileStore, PokedexService, RecordStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let auth_config = AuthConfig::from_env();
    let cache_config = CacheConfig::from_env();

    let cache = CacheAdapter::connect(&cache_config).await.map_err(|e| {
        ApiError::service_unavailable(format!("Cache initialization failed: {}", e))
    })?;
    tracing::info!(
        mode = %cache.mode(),
        endpoint = cache.endpoint().unwrap_or("none"),
        refresh_mode = ?cache_config.refresh_mode,
        "Cache ready"
    );

    let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(api_config.data_path.clone()));
    tracing::info!(location = %store.location(), "Record store configured");

    let service = Arc::new(PokedexService::new(store, cache, cache_config));
    if let Err(e) = service.check_store().await {
        tracing::warn!(error = %e, "Record store is not readable yet");
    }

    let app: Router = create_api_router(service, &api_config, auth_config)?;

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Pokedex API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
