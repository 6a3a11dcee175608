//! Cache backend trait and usage statistics.
//!
//! A backend stores opaque string values under string keys. The collection
//! is serialized once by the caller, so backends never see record types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pokedex_core::CacheError;

/// Remote key-value cache.
///
/// Implementations must be thread-safe. Deadlines are enforced by the
/// adapter, not by the backend.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a value. `Ok(None)` is a plain miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value, replacing any previous one.
    ///
    /// With `ttl` set the entry expires after that duration.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Round-trip check used by readiness probes.
    async fn ping(&self) -> Result<(), CacheError>;

    /// Endpoint description for logs, with credentials removed.
    fn endpoint(&self) -> String;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by the cache.
    pub hits: u64,
    /// Lookups where the key was absent or the payload unusable.
    pub misses: u64,
    /// Lookups abandoned at the read deadline.
    pub timeouts: u64,
    /// Lookups that failed with a backend error.
    pub errors: u64,
    /// Successful writes.
    pub writes: u64,
    /// Writes that failed or timed out.
    pub write_failures: u64,
    /// Post-write refreshes that exhausted their attempts.
    pub refresh_failures: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0) over all lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.timeouts + self.errors;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Live counters behind [`CacheStats`].
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub timeouts: AtomicU64,
    pub errors: AtomicU64,
    pub writes: AtomicU64,
    pub write_failures: AtomicU64,
    pub refresh_failures: AtomicU64,
}

impl CacheCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }
}
