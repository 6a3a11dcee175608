//! Cache adapter: the only path from services to a cache backend.
//!
//! Every operation is bounded by a deadline and none of them fail. A lookup
//! that times out or errors is reported as a kind of miss; a write that
//! fails is logged and reported as `false`. Connection problems at startup
//! either abort (fail-fast environments) or leave the adapter degraded.

use std::sync::Arc;
use std::time::Duration;

use pokedex_core::{CacheError, Record, RecordCollection};

use super::config::CacheConfig;
use super::redis_backend::RedisCacheBackend;
use super::traits::{CacheBackend, CacheCounters, CacheStats};

/// Operating mode of the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// No cache configured. Every lookup is a miss and nothing is written.
    Disabled,
    /// Backend reachable at startup.
    Connected,
    /// Backend configured but unreachable at startup. Every lookup is a miss.
    Degraded,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Connected => "connected",
            Self::Degraded => "degraded",
        }
    }
}

impl std::fmt::Display for CacheMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a bounded cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// The deadline fired before the backend answered.
    TimedOut,
    /// The backend failed, or the adapter is degraded.
    Unavailable,
}

impl<T> CacheLookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Hit(_) => "hit",
            Self::Miss => "miss",
            Self::TimedOut => "timeout",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Raw backend answer before hit/miss accounting.
enum RawLookup {
    Value(String),
    Absent,
    TimedOut,
    Failed,
}

/// Shared handle to the cache. Cheap to clone.
#[derive(Clone)]
pub struct CacheAdapter {
    backend: Option<Arc<dyn CacheBackend>>,
    mode: CacheMode,
    endpoint: Option<String>,
    ttl: Option<Duration>,
    write_timeout: Duration,
    counters: Arc<CacheCounters>,
}

impl std::fmt::Debug for CacheAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheAdapter")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CacheAdapter {
    /// Build the adapter for a configuration.
    ///
    /// - no URL: disabled adapter, no I/O
    /// - connection error with `fail_fast`: `Err(CacheError::Connection)`
    /// - connection error otherwise: degraded adapter
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let Some(url) = config.url.as_deref() else {
            tracing::info!("No cache URL configured, caching disabled");
            return Ok(Self::disabled());
        };

        match RedisCacheBackend::connect(url, config.connect_timeout).await {
            Ok(backend) => Ok(Self::with_backend(Arc::new(backend), config)),
            Err(e) if config.fail_fast => {
                tracing::error!(error = %e, "Cache connection failed, aborting startup");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Cache connection failed, continuing without cache"
                );
                Ok(Self {
                    backend: None,
                    mode: CacheMode::Degraded,
                    endpoint: Some(super::redis_backend::redact_url(url)),
                    ttl: config.ttl,
                    write_timeout: config.write_timeout,
                    counters: Arc::new(CacheCounters::default()),
                })
            }
        }
    }

    /// Adapter over an already-constructed backend.
    pub fn with_backend(backend: Arc<dyn CacheBackend>, config: &CacheConfig) -> Self {
        let endpoint = backend.endpoint();
        Self {
            backend: Some(backend),
            mode: CacheMode::Connected,
            endpoint: Some(endpoint),
            ttl: config.ttl,
            write_timeout: config.write_timeout,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// Adapter with caching turned off.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            mode: CacheMode::Disabled,
            endpoint: None,
            ttl: None,
            write_timeout: Duration::ZERO,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Whether writes can reach a backend at all.
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    async fn lookup_raw(&self, key: &str, deadline: Duration) -> RawLookup {
        let Some(backend) = &self.backend else {
            return RawLookup::Failed;
        };

        match tokio::time::timeout(deadline, backend.get(key)).await {
            Ok(Ok(Some(value))) => RawLookup::Value(value),
            Ok(Ok(None)) => RawLookup::Absent,
            Ok(Err(e)) => {
                CacheCounters::bump(&self.counters.errors);
                tracing::warn!(key = %key, error = %e, "Cache lookup failed");
                RawLookup::Failed
            }
            Err(_) => {
                CacheCounters::bump(&self.counters.timeouts);
                tracing::debug!(
                    key = %key,
                    deadline_ms = deadline.as_millis() as u64,
                    "Cache lookup timed out"
                );
                RawLookup::TimedOut
            }
        }
    }

    /// Look up a raw value within `deadline`.
    pub async fn get(&self, key: &str, deadline: Duration) -> CacheLookup<String> {
        match self.lookup_raw(key, deadline).await {
            RawLookup::Value(value) => {
                CacheCounters::bump(&self.counters.hits);
                CacheLookup::Hit(value)
            }
            RawLookup::Absent => {
                CacheCounters::bump(&self.counters.misses);
                CacheLookup::Miss
            }
            RawLookup::TimedOut => CacheLookup::TimedOut,
            RawLookup::Failed => self.unreachable_lookup(),
        }
    }

    /// Look up and decode the cached collection within `deadline`.
    ///
    /// A payload that does not decode is a miss.
    pub async fn get_collection(
        &self,
        key: &str,
        deadline: Duration,
    ) -> CacheLookup<RecordCollection> {
        match self.lookup_raw(key, deadline).await {
            RawLookup::Value(raw) => match serde_json::from_str::<RecordCollection>(&raw) {
                Ok(records) => {
                    CacheCounters::bump(&self.counters.hits);
                    CacheLookup::Hit(records)
                }
                Err(e) => {
                    CacheCounters::bump(&self.counters.misses);
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    CacheLookup::Miss
                }
            },
            RawLookup::Absent => {
                CacheCounters::bump(&self.counters.misses);
                CacheLookup::Miss
            }
            RawLookup::TimedOut => CacheLookup::TimedOut,
            RawLookup::Failed => self.unreachable_lookup(),
        }
    }

    fn unreachable_lookup<T>(&self) -> CacheLookup<T> {
        match self.mode {
            CacheMode::Disabled => CacheLookup::Miss,
            CacheMode::Connected | CacheMode::Degraded => CacheLookup::Unavailable,
        }
    }

    /// Best-effort write. Returns whether the value was stored.
    pub async fn set(&self, key: &str, value: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match tokio::time::timeout(self.write_timeout, backend.set(key, value, self.ttl)).await {
            Ok(Ok(())) => {
                CacheCounters::bump(&self.counters.writes);
                true
            }
            Ok(Err(e)) => {
                CacheCounters::bump(&self.counters.write_failures);
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                false
            }
            Err(_) => {
                CacheCounters::bump(&self.counters.write_failures);
                let e = CacheError::Timeout {
                    operation: "set",
                    after_ms: self.write_timeout.as_millis() as u64,
                };
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Serialize and store the whole collection. Best-effort.
    pub async fn put_collection(&self, key: &str, records: &[Record]) -> bool {
        if !self.is_active() {
            return false;
        }
        match serde_json::to_string(records) {
            Ok(payload) => self.set(key, &payload).await,
            Err(e) => {
                CacheCounters::bump(&self.counters.write_failures);
                let e = CacheError::Encode {
                    reason: e.to_string(),
                };
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Round-trip check for readiness probes, bounded by `deadline`.
    pub async fn ping(&self, deadline: Duration) -> Result<(), CacheError> {
        match (&self.backend, self.mode) {
            (_, CacheMode::Disabled) => Ok(()),
            (None, _) => Err(CacheError::Connection {
                endpoint: self.endpoint.clone().unwrap_or_default(),
                reason: "cache running degraded".to_string(),
            }),
            (Some(backend), _) => tokio::time::timeout(deadline, backend.ping())
                .await
                .map_err(|_| CacheError::Timeout {
                    operation: "ping",
                    after_ms: deadline.as_millis() as u64,
                })?,
        }
    }

    pub(crate) fn record_refresh_failure(&self) {
        CacheCounters::bump(&self.counters.refresh_failures);
    }
}
