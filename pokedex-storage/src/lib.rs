//! Pokedex Storage - Record Store, Cache and Service
//!
//! The record store is the system of record. The Redis cache holds a single
//! serialized snapshot of the whole collection and can always be rebuilt
//! from the store. `PokedexService` ties the two together: reads go through
//! the cache, writes go to the store and then refresh the cache.

pub mod cache;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use cache::{
    CacheAdapter, CacheBackend, CacheConfig, CacheLookup, CacheMode, CacheRead, CacheStats,
    InMemoryCacheBackend, ListOutcome, ReadSource, ReadThroughCache, RedisCacheBackend,
    RefreshMode, RefreshReport, WriteGeneration, WriteInvalidator,
};
pub use service::PokedexService;
pub use store::{InMemoryRecordStore, JsonFileStore, RecordStore};
