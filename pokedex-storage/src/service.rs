//! Pokedex service: reads through the cache, writes to the store.
//!
//! Every mutation runs a full load-modify-save cycle against the record
//! store while holding the single writer lock, advances the write
//! generation, then hands off to the write invalidator. Reads never take the
//! writer lock.

use std::sync::Arc;

use pokedex_core::{
    position_of, search, PokedexError, PokedexResult, PokemonNumber, Record, RecordFields,
    SearchHit, SearchQuery, StoreError,
};
use tokio::sync::Mutex;

use crate::cache::{
    CacheAdapter, CacheConfig, CacheMode, CacheRead, CacheStats, ListOutcome, ReadThroughCache,
    WriteGeneration, WriteInvalidator,
};
use crate::store::RecordStore;

/// Application service over the record store and its cache.
pub struct PokedexService {
    store: Arc<dyn RecordStore>,
    reader: ReadThroughCache,
    invalidator: WriteInvalidator,
    cache: CacheAdapter,
    generation: WriteGeneration,
    write_lock: Mutex<()>,
}

impl PokedexService {
    pub fn new(store: Arc<dyn RecordStore>, cache: CacheAdapter, config: CacheConfig) -> Self {
        let generation = WriteGeneration::new();
        Self {
            reader: ReadThroughCache::new(store.clone(), cache.clone(), config.clone())
                .with_generation(generation.clone()),
            invalidator: WriteInvalidator::new(store.clone(), cache.clone(), config)
                .with_generation(generation.clone()),
            store,
            cache,
            generation,
            write_lock: Mutex::new(()),
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    /// Full collection for the list endpoint.
    pub async fn list(&self) -> ListOutcome {
        self.reader.load_collection().await
    }

    /// Search the materialized collection by id or type.
    pub async fn search(&self, query: &SearchQuery) -> PokedexResult<CacheRead<SearchHit>> {
        let read = self.reader.materialize().await?;
        let source = read.source();
        let hit = search(read.value(), query)?;
        tracing::debug!(query = ?query, source = source.as_str(), "Search answered");
        Ok(read.map(|_| hit))
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Append a validated record. Numbers must be unique.
    pub async fn insert(&self, record: Record) -> PokedexResult<Record> {
        {
            let _guard = self.write_lock.lock().await;
            let mut records = self.store.load().await?;

            if position_of(&records, record.number).is_some() {
                return Err(PokedexError::AlreadyExists {
                    number: record.number,
                });
            }

            records.push(record.clone());
            self.store.save(&records).await?;
            self.generation.advance();
        }

        tracing::info!(number = record.number, name = %record.name, "Inserted pokemon");
        self.invalidator.after_write().await;
        Ok(record)
    }

    /// Replace the record with `number` wholesale. Returns the new record.
    pub async fn update(&self, number: PokemonNumber, fields: RecordFields) -> PokedexResult<Record> {
        let updated = fields.into_record(number);
        {
            let _guard = self.write_lock.lock().await;
            let mut records = self.store.load().await?;

            let index = position_of(&records, number).ok_or(PokedexError::NotFound { number })?;
            records[index] = updated.clone();
            self.store.save(&records).await?;
            self.generation.advance();
        }

        tracing::info!(number, "Updated pokemon");
        self.invalidator.after_write().await;
        Ok(updated)
    }

    /// Remove the record with `number`. Returns the removed record.
    pub async fn delete(&self, number: PokemonNumber) -> PokedexResult<Record> {
        let deleted = {
            let _guard = self.write_lock.lock().await;
            let mut records = self.store.load().await?;

            let index = position_of(&records, number).ok_or(PokedexError::NotFound { number })?;
            let deleted = records.remove(index);
            self.store.save(&records).await?;
            self.generation.advance();
            deleted
        };

        tracing::info!(number, "Deleted pokemon");
        self.invalidator.after_write().await;
        Ok(deleted)
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Read the store directly, bypassing the cache. Returns the record count.
    pub async fn check_store(&self) -> Result<usize, StoreError> {
        self.store.load().await.map(|records| records.len())
    }

    pub fn cache(&self) -> &CacheAdapter {
        &self.cache
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache.mode()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for PokedexService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokedexService")
            .field("store", &self.store.location())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
