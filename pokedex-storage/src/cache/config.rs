//! Cache configuration.
//!
//! Loaded from environment variables with development defaults, like the
//! rest of the service configuration.

use std::time::Duration;

/// Default cache key holding the serialized collection.
pub const DEFAULT_CACHE_KEY: &str = "pokemonList";

/// How cache writes triggered by a request relate to that request's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Spawn the cache write and answer immediately.
    #[default]
    Background,
    /// Await the cache write before answering.
    Inline,
}

impl std::str::FromStr for RefreshMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "background" | "async" => Ok(Self::Background),
            "inline" | "sync" => Ok(Self::Inline),
            other => Err(format!("Unknown cache refresh mode: {}", other)),
        }
    }
}

/// Configuration for the cache adapter, read-through and invalidation paths.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Redis URL. `None` disables caching entirely.
    pub url: Option<String>,
    /// Key under which the whole collection is cached.
    pub key: String,
    /// Deadline for a read-through lookup before falling back to the store.
    pub read_timeout: Duration,
    /// Deadline for a single cache write.
    pub write_timeout: Duration,
    /// Deadline for establishing the initial connection.
    pub connect_timeout: Duration,
    /// Expiry for cached snapshots. `None` keeps them until overwritten.
    pub ttl: Option<Duration>,
    /// Whether cache writes block the response.
    pub refresh_mode: RefreshMode,
    /// Attempts per post-write refresh, at least one.
    pub refresh_attempts: u32,
    /// Abort startup on a connection error instead of running degraded.
    pub fail_fast: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: DEFAULT_CACHE_KEY.to_string(),
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(2),
            ttl: None,
            refresh_mode: RefreshMode::Background,
            refresh_attempts: 2,
            fail_fast: false,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create CacheConfig from environment variables.
    ///
    /// Environment variables:
    /// - `POKEDEX_REDIS_URL`: Redis URL (unset = caching disabled)
    /// - `POKEDEX_CACHE_KEY`: cache key (default: `pokemonList`)
    /// - `POKEDEX_CACHE_READ_TIMEOUT_MS`: read-through deadline (default: 1000)
    /// - `POKEDEX_CACHE_WRITE_TIMEOUT_MS`: write deadline (default: 1000)
    /// - `POKEDEX_CACHE_CONNECT_TIMEOUT_MS`: connect deadline (default: 2000)
    /// - `POKEDEX_CACHE_TTL_SECS`: snapshot expiry (default: none)
    /// - `POKEDEX_CACHE_REFRESH_MODE`: `background` or `inline` (default: background)
    /// - `POKEDEX_CACHE_REFRESH_ATTEMPTS`: refresh attempts (default: 2)
    /// - `POKEDEX_ENVIRONMENT`: `test` or `ci` turns on fail-fast
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let url = std::env::var("POKEDEX_REDIS_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let key = std::env::var("POKEDEX_CACHE_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.key);

        let refresh_mode = std::env::var("POKEDEX_CACHE_REFRESH_MODE")
            .ok()
            .and_then(|s| match s.parse() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring POKEDEX_CACHE_REFRESH_MODE");
                    None
                }
            })
            .unwrap_or(defaults.refresh_mode);

        Self {
            url,
            key,
            read_timeout: env_millis("POKEDEX_CACHE_READ_TIMEOUT_MS").unwrap_or(defaults.read_timeout),
            write_timeout: env_millis("POKEDEX_CACHE_WRITE_TIMEOUT_MS")
                .unwrap_or(defaults.write_timeout),
            connect_timeout: env_millis("POKEDEX_CACHE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout),
            ttl: std::env::var("POKEDEX_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            refresh_mode,
            refresh_attempts: std::env::var("POKEDEX_CACHE_REFRESH_ATTEMPTS")
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(defaults.refresh_attempts)
                .max(1),
            fail_fast: is_automation_environment(),
        }
    }

    /// Set the Redis URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the cache key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the read-through deadline.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write deadline.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the connect deadline.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the snapshot TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the refresh mode.
    pub fn with_refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    /// Set the number of refresh attempts (minimum one).
    pub fn with_refresh_attempts(mut self, attempts: u32) -> Self {
        self.refresh_attempts = attempts.max(1);
        self
    }

    /// Enable or disable fail-fast initialization.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// True when `POKEDEX_ENVIRONMENT` names a test or automation environment.
pub fn is_automation_environment() -> bool {
    std::env::var("POKEDEX_ENVIRONMENT")
        .map(|e| matches!(e.to_lowercase().as_str(), "test" | "ci"))
        .unwrap_or(false)
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}
