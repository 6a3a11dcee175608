//! Axum Middleware for Authentication
//!
//! This module provides the basic-auth gate applied to mutating routes:
//! - Reads the `Authorization` header
//! - Verifies it against the configured admin credentials
//! - Injects AuthContext into request extensions
//! - Returns 401 with a `WWW-Authenticate` challenge otherwise

use crate::auth::{authenticate_basic, AuthConfig, AUTH_REALM};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

// ============================================================================
// MIDDLEWARE STATE
// ============================================================================

/// Shared state for authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    /// Authentication configuration
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    /// Create new middleware state with the given auth configuration.
    pub fn new(auth_config: AuthConfig) -> Self {
        Self {
            auth_config: Arc::new(auth_config),
        }
    }
}

// ============================================================================
// MIDDLEWARE FUNCTION
// ============================================================================

/// Axum middleware enforcing HTTP Basic authentication.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, middleware, routing::post};
/// use pokedex_api::middleware::{basic_auth_middleware, AuthMiddlewareState};
/// use pokedex_api::AuthConfig;
///
/// let auth_state = AuthMiddlewareState::new(AuthConfig::from_env());
///
/// let app = Router::new()
///     .route("/api/pokemon", post(|| async { "OK" }))
///     .layer(middleware::from_fn_with_state(auth_state, basic_auth_middleware));
/// ```
pub async fn basic_auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthMiddlewareError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let auth_context =
        authenticate_basic(&state.auth_config, auth_header).map_err(AuthMiddlewareError)?;

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Error wrapper for middleware that implements IntoResponse.
///
/// Adds the `WWW-Authenticate` challenge to every 401.
#[derive(Debug)]
pub struct AuthMiddlewareError(pub ApiError);

impl IntoResponse for AuthMiddlewareError {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        if let Ok(challenge) =
            HeaderValue::from_str(&format!("Basic realm=\"{}\", charset=\"UTF-8\"", AUTH_REALM))
        {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response
    }
}
