//! API Configuration Module
//!
//! Server, CORS and request-handling settings for the HTTP layer. Loaded from
//! environment variables with defaults suitable for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

/// Default location of the JSON record store.
pub const DEFAULT_DATA_PATH: &str = "data/pokemonData.json";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding, storage location, CORS and validation.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server Configuration
    // ========================================================================
    /// Host the listener binds to.
    pub bind_host: String,

    /// Port the listener binds to.
    pub port: u16,

    /// Path of the JSON record store.
    pub data_path: PathBuf,

    /// Deployment environment name (`development`, `production`, `test`, ...).
    pub environment: String,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Request Handling
    // ========================================================================
    /// Answer an insert with missing fields with 400 instead of 200.
    pub strict_validation: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            environment: "development".to_string(),
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            strict_validation: false,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POKEDEX_API_BIND`: listen host (default: 0.0.0.0)
    /// - `PORT` or `POKEDEX_API_PORT`: listen port (default: 3000)
    /// - `POKEDEX_DATA_PATH`: JSON record store path (default: data/pokemonData.json)
    /// - `POKEDEX_ENVIRONMENT`: deployment environment (default: development)
    /// - `POKEDEX_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `POKEDEX_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `POKEDEX_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `POKEDEX_STRICT_VALIDATION`: "true" answers missing insert fields with 400
    ///
    /// # Errors
    /// Returns an error if the port is not a valid `u16`.
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("POKEDEX_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("POKEDEX_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        Ok(Self {
            bind_host: std::env::var("POKEDEX_API_BIND").unwrap_or(defaults.bind_host),
            port,
            data_path: std::env::var("POKEDEX_DATA_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            environment: std::env::var("POKEDEX_ENVIRONMENT")
                .map(|s| s.to_lowercase())
                .unwrap_or(defaults.environment),
            cors_origins,
            cors_allow_credentials: env_flag("POKEDEX_CORS_ALLOW_CREDENTIALS"),
            cors_max_age_secs: std::env::var("POKEDEX_CORS_MAX_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cors_max_age_secs),
            strict_validation: env_flag("POKEDEX_STRICT_VALIDATION"),
        })
    }

    /// Socket address the server listens on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if running in a production environment.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|allowed| allowed == origin)
    }

    /// Enable or disable strict insert validation.
    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Set the record store path.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }
}

/// True for `production` and `prod`, case-insensitive.
pub fn is_production_environment(environment: &str) -> bool {
    matches!(environment.to_lowercase().as_str(), "production" | "prod")
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
