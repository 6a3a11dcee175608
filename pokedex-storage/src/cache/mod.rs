//! Cache layer for the record collection.
//!
//! The cache holds one entry: the whole collection, serialized as JSON under
//! a fixed key. It is a disposable projection of the record store and is
//! never consulted for writes.
//!
//! # Layers
//!
//! - [`CacheBackend`]: raw key-value access (Redis, or in-memory for tests)
//! - [`CacheAdapter`]: deadlines, hit/miss accounting, degraded mode
//! - [`ReadThroughCache`]: cache-then-store read path with repopulation
//! - [`WriteInvalidator`]: post-write refresh with bounded retry
//! - [`WriteGeneration`]: keeps repopulation from overwriting a newer refresh
//!
//! Outside of startup and readiness pings no `CacheError` escapes this
//! module: callers see [`CacheLookup`] variants, `bool` write results and
//! [`RefreshReport`]s.

pub mod adapter;
pub mod config;
pub mod generation;
pub mod invalidation;
pub mod memory_backend;
pub mod outcome;
pub mod read_through;
pub mod redis_backend;
pub mod traits;

pub use adapter::{CacheAdapter, CacheLookup, CacheMode};
pub use config::{is_automation_environment, CacheConfig, RefreshMode, DEFAULT_CACHE_KEY};
pub use generation::WriteGeneration;
pub use invalidation::{RefreshReport, WriteInvalidator};
pub use memory_backend::InMemoryCacheBackend;
pub use outcome::{CacheRead, ListOutcome, ReadSource};
pub use read_through::ReadThroughCache;
pub use redis_backend::RedisCacheBackend;
pub use traits::{CacheBackend, CacheStats};
