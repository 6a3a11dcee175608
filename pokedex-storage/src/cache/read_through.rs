//! Read-through cache for the record collection.
//!
//! This module implements the core read path: consult the cache under a
//! deadline, fall back to the record store on anything but a usable hit,
//! and repopulate the cache from what the store returned.
//!
//! There are no retries within a request. A slow or broken cache costs at
//! most one read deadline before the store answers.
//!
//! Repopulation is ordered against post-write refreshes through the shared
//! [`WriteGeneration`]: a snapshot loaded before a write that has since
//! committed is never written to the cache.

use std::sync::Arc;

use pokedex_core::{RecordCollection, StoreError};

use super::adapter::{CacheAdapter, CacheLookup};
use super::config::{CacheConfig, RefreshMode};
use super::generation::WriteGeneration;
use super::outcome::{CacheRead, ListOutcome};
use crate::store::RecordStore;

/// Read-through cache over a record store.
#[derive(Clone)]
pub struct ReadThroughCache {
    store: Arc<dyn RecordStore>,
    cache: CacheAdapter,
    config: Arc<CacheConfig>,
    generation: WriteGeneration,
}

impl ReadThroughCache {
    pub fn new(store: Arc<dyn RecordStore>, cache: CacheAdapter, config: CacheConfig) -> Self {
        Self {
            store,
            cache,
            config: Arc::new(config),
            generation: WriteGeneration::new(),
        }
    }

    /// Share the write generation advanced by the writer.
    pub fn with_generation(mut self, generation: WriteGeneration) -> Self {
        self.generation = generation;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheAdapter {
        &self.cache
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Load the collection for the list endpoint.
    ///
    /// An empty collection, cached or stored, is `ListOutcome::Empty`.
    pub async fn load_collection(&self) -> ListOutcome {
        match self.materialize().await {
            Ok(read) if read.value().is_empty() => ListOutcome::Empty,
            Ok(read) => ListOutcome::Found(read),
            Err(e) => ListOutcome::Failed(e),
        }
    }

    /// Materialize the full collection, from the cache when possible.
    ///
    /// Unlike [`load_collection`](Self::load_collection), an empty collection
    /// is returned as-is.
    pub async fn materialize(&self) -> Result<CacheRead<RecordCollection>, StoreError> {
        let key = &self.config.key;

        match self.cache.get_collection(key, self.config.read_timeout).await {
            CacheLookup::Hit(records) => {
                tracing::debug!(key = %key, count = records.len(), "Collection served from cache");
                return Ok(CacheRead::from_cache(records));
            }
            lookup => {
                tracing::debug!(
                    key = %key,
                    outcome = lookup.outcome(),
                    "Cache did not answer, reading record store"
                );
            }
        }

        let loaded_at = self.generation.current();
        let records = self.store.load().await.map_err(|e| {
            tracing::error!(
                location = %self.store.location(),
                error = %e,
                "Failed to load record collection"
            );
            e
        })?;

        if !records.is_empty() {
            self.repopulate(records.clone(), loaded_at).await;
        }

        Ok(CacheRead::from_storage(records))
    }

    async fn repopulate(&self, records: RecordCollection, loaded_at: u64) {
        if !self.cache.is_active() {
            return;
        }

        match self.config.refresh_mode {
            RefreshMode::Inline => {
                self.store_snapshot(records, loaded_at).await;
            }
            RefreshMode::Background => {
                let this = self.clone();
                tokio::spawn(async move {
                    this.store_snapshot(records, loaded_at).await;
                });
            }
        }
    }

    /// Write a store snapshot unless a write committed after it was loaded.
    async fn store_snapshot(&self, records: RecordCollection, loaded_at: u64) -> bool {
        let _guard = self.generation.lock().await;

        let current = self.generation.current();
        if current != loaded_at {
            tracing::debug!(
                key = %self.config.key,
                loaded_at,
                current,
                "Dropping repopulation older than the last write"
            );
            return false;
        }

        self.cache.put_collection(&self.config.key, &records).await
    }
}

impl std::fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("store", &self.store.location())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .field("generation", &self.generation.current())
            .finish()
    }
}
