//! Authentication for mutating routes.
//!
//! Mutations are gated by HTTP Basic authentication against a single admin
//! credential pair taken from the environment. Reads are public.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};

use crate::config::is_production_environment;
use crate::error::{ApiError, ApiResult};

/// Development fallback username.
pub const DEFAULT_ADMIN_USER: &str = "admin";

/// Development fallback password.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

/// Realm advertised in `WWW-Authenticate`.
pub const AUTH_REALM: &str = "pokedex";

// ============================================================================
// ADMIN PASSWORD (TYPE-SAFE)
// ============================================================================

/// Admin password that cannot be logged by accident.
#[derive(Clone)]
pub struct AdminPassword(SecretString);

impl AdminPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(SecretString::from(password.into()))
    }

    /// Compare against a candidate without exposing the secret to callers.
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.expose_secret().as_bytes(), candidate.as_bytes())
    }

    /// Get the length of the password without exposing it.
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// Check if the password is the development default.
    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == DEFAULT_ADMIN_PASSWORD
    }
}

impl std::fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminPassword([REDACTED, {} chars])", self.len())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Credentials accepted by the basic-auth gate.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub admin_user: String,
    pub admin_password: AdminPassword,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_user: DEFAULT_ADMIN_USER.to_string(),
            admin_password: AdminPassword::new(DEFAULT_ADMIN_PASSWORD),
        }
    }
}

impl AuthConfig {
    pub fn new(admin_user: impl Into<String>, admin_password: impl Into<String>) -> Self {
        Self {
            admin_user: admin_user.into(),
            admin_password: AdminPassword::new(admin_password),
        }
    }

    /// Create AuthConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POKEDEX_ADMIN_USER`: basic-auth username (default: admin)
    /// - `POKEDEX_ADMIN_PASSWORD`: basic-auth password (default: password)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let admin_user = std::env::var("POKEDEX_ADMIN_USER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.admin_user);

        let admin_password = std::env::var("POKEDEX_ADMIN_PASSWORD")
            .ok()
            .filter(|s| !s.is_empty())
            .map(AdminPassword::new)
            .unwrap_or(defaults.admin_password);

        Self {
            admin_user,
            admin_password,
        }
    }

    /// Refuse the development defaults in production. Elsewhere they only
    /// produce a warning.
    pub fn validate_for_environment(&self, environment: &str) -> ApiResult<()> {
        if !self.admin_password.is_insecure_default() {
            return Ok(());
        }

        if is_production_environment(environment) {
            return Err(ApiError::invalid_input(format!(
                "Cannot start server in production with the default admin password. \
                 Set POKEDEX_ADMIN_PASSWORD. POKEDEX_ENVIRONMENT={}",
                environment
            )));
        }

        tracing::warn!(
            environment = %environment,
            "Using the default admin password; set POKEDEX_ADMIN_PASSWORD before deploying"
        );
        Ok(())
    }

    /// Check a username/password pair.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        // Evaluate both so a wrong user costs the same as a wrong password.
        let user_ok = constant_time_eq(self.admin_user.as_bytes(), username.as_bytes());
        let password_ok = self.admin_password.matches(password);
        user_ok & password_ok
    }
}

// ============================================================================
// BASIC AUTH
// ============================================================================

/// Identity established by a successful basic-auth check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
}

/// Decode an `Authorization: Basic ...` header value into `(user, password)`.
pub fn decode_basic_credentials(header_value: &str) -> ApiResult<(String, String)> {
    let (scheme, encoded) = header_value
        .trim()
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use Basic scheme"))?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(ApiError::unauthorized(
            "Authorization header must use Basic scheme",
        ));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::unauthorized("Malformed basic credentials"))?;
    let decoded =
        String::from_utf8(decoded).map_err(|_| ApiError::unauthorized("Malformed basic credentials"))?;

    let (user, password) = decoded
        .split_once(':')
        .ok_or_else(|| ApiError::unauthorized("Malformed basic credentials"))?;

    Ok((user.to_string(), password.to_string()))
}

/// Authenticate a request from its `Authorization` header.
pub fn authenticate_basic(config: &AuthConfig, header_value: Option<&str>) -> ApiResult<AuthContext> {
    let header_value =
        header_value.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let (username, password) = decode_basic_credentials(header_value)?;

    if !config.verify(&username, &password) {
        tracing::warn!(username = %username, "Rejected basic credentials");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    Ok(AuthContext { username })
}

/// Build a `Basic` header value. Used by clients and tests.
pub fn basic_header_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_default_credentials_authenticate() -> ApiResult<()> {
        let config = AuthConfig::default();
        let header = basic_header_value("admin", "password");
        let ctx = authenticate_basic(&config, Some(&header))?;
        assert_eq!(ctx.username, "admin");
        Ok(())
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let err = authenticate_basic(&AuthConfig::default(), None).expect_err("no header");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_wrong_password_is_unauthorized() {
        let header = basic_header_value("admin", "hunter2");
        assert!(authenticate_basic(&AuthConfig::default(), Some(&header)).is_err());
    }

    #[test]
    fn test_bearer_scheme_is_rejected() {
        let err = decode_basic_credentials("Bearer abc.def.ghi").expect_err("wrong scheme");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_malformed_base64_is_rejected() {
        assert!(decode_basic_credentials("Basic %%%").is_err());
        // "adminpassword" has no colon separator.
        assert!(decode_basic_credentials("Basic YWRtaW5wYXNzd29yZA==").is_err());
    }

    #[test]
    fn test_password_may_contain_colons() -> ApiResult<()> {
        let header = basic_header_value("ash", "pika:chu");
        let (user, password) = decode_basic_credentials(&header)?;
        assert_eq!(user, "ash");
        assert_eq!(password, "pika:chu");
        Ok(())
    }

    #[test]
    fn test_scheme_is_case_insensitive() -> ApiResult<()> {
        let header = basic_header_value("admin", "password").replacen("Basic", "basic", 1);
        let (user, _) = decode_basic_credentials(&header)?;
        assert_eq!(user, "admin");
        Ok(())
    }

    #[test]
    fn test_password_is_redacted_in_debug() {
        let config = AuthConfig::new("misty", "starmie-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("starmie-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_default_password_refused_in_production() {
        let config = AuthConfig::default();
        assert!(config.validate_for_environment("production").is_err());
        assert!(config.validate_for_environment("prod").is_err());
        assert!(config.validate_for_environment("development").is_ok());

        let config = AuthConfig::new("admin", "a-real-password");
        assert!(config.validate_for_environment("production").is_ok());
    }
}
