//! Pokedex API - REST Layer
//!
//! Axum routes over [`pokedex_storage::PokedexService`]: public cached reads,
//! basic-auth mutations, health probes, Prometheus metrics and the OpenAPI
//! document.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use auth::{authenticate_basic, basic_header_value, AuthConfig, AuthContext};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use middleware::{basic_auth_middleware, AuthMiddlewareState};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use types::*;
