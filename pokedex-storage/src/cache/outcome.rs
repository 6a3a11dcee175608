//! Read results carrying their provenance.

use chrono::{DateTime, Utc};
use pokedex_core::{RecordCollection, StoreError};

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Store,
}

impl ReadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Store => "store",
        }
    }
}

/// Result of a read, tagged with its source.
///
/// Callers must go through `value()` or `into_value()`, so the provenance
/// is always at hand for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<T> {
    value: T,
    source: ReadSource,
    fetched_at: DateTime<Utc>,
}

impl<T> CacheRead<T> {
    /// Create a read answered by the cache.
    pub fn from_cache(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Cache,
            fetched_at: Utc::now(),
        }
    }

    /// Create a read answered by the record store.
    pub fn from_storage(value: T) -> Self {
        Self {
            value,
            source: ReadSource::Store,
            fetched_at: Utc::now(),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn was_cache_hit(&self) -> bool {
        self.source == ReadSource::Cache
    }

    /// Map the inner value to a new type.
    pub fn map<U, F>(self, f: F) -> CacheRead<U>
    where
        F: FnOnce(T) -> U,
    {
        CacheRead {
            value: f(self.value),
            source: self.source,
            fetched_at: self.fetched_at,
        }
    }
}

impl<T> AsRef<T> for CacheRead<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

/// Outcome of the read-through list path.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome {
    /// Non-empty collection.
    Found(CacheRead<RecordCollection>),
    /// Neither cache nor store holds any record.
    Empty,
    /// Cache missed and the store could not be read.
    Failed(StoreError),
}
