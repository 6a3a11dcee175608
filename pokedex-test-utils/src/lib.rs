//! Pokedex Test Utilities
//!
//! Shared test infrastructure for the Pokedex workspace:
//! - Proptest generators for records and collections
//! - Fault-injecting cache backends and record stores
//! - Test fixtures for common scenarios

// Re-export core types for convenience
pub use pokedex_core::{
    CacheError, PokedexError, PokedexResult, PokemonNumber, Record, RecordCollection,
    RecordDraft, RecordFields, StoreError,
};
pub use pokedex_storage::{
    CacheAdapter, CacheBackend, CacheConfig, InMemoryCacheBackend, InMemoryRecordStore,
    JsonFileStore, PokedexService, RecordStore, RefreshMode,
};

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

// ============================================================================
// FAULT-INJECTING DOUBLES
// ============================================================================

/// Cache backend that answers only after `delay`.
#[derive(Debug)]
pub struct SlowCacheBackend {
    delay: Duration,
    inner: InMemoryCacheBackend,
}

impl SlowCacheBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryCacheBackend::new(),
        }
    }

    /// Seed a value without waiting.
    pub async fn seed(&self, key: &str, value: &str) {
        // In-memory set is infallible.
        let _ = self.inner.set(key, value, None).await;
    }
}

#[async_trait]
impl CacheBackend for SlowCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value, ttl).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn endpoint(&self) -> String {
        "slow-memory".to_string()
    }
}

/// Cache backend that behaves like a Redis server that went away.
#[derive(Debug, Default)]
pub struct FailingCacheBackend {
    calls: AtomicU32,
}

impl FailingCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands attempted so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn refuse(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Connection {
            endpoint: self.endpoint(),
            reason: "Connection refused (os error 111)".to_string(),
        }
    }
}

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(self.refuse())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(self.refuse())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Err(self.refuse())
    }

    fn endpoint(&self) -> String {
        "redis://127.0.0.1:6379".to_string()
    }
}

/// Record store whose reads and writes can be switched to fail at runtime.
#[derive(Debug, Default)]
pub struct FailingRecordStore {
    inner: InMemoryRecordStore,
    fail_load: AtomicBool,
    fail_save: AtomicBool,
}

impl FailingRecordStore {
    pub fn with_records(records: RecordCollection) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(records),
            ..Default::default()
        }
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_save(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub async fn snapshot(&self) -> RecordCollection {
        self.inner.snapshot().await
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn load(&self) -> Result<RecordCollection, StoreError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                location: self.location(),
                reason: "Permission denied (os error 13)".to_string(),
            });
        }
        self.inner.load().await
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                location: self.location(),
                reason: "No space left on device (os error 28)".to_string(),
            });
        }
        self.inner.save(records).await
    }

    fn location(&self) -> String {
        "failing-memory".to_string()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for records and collections.

    use super::*;
    use proptest::prelude::*;

    /// Type names drawn from the real data set, plus the empty slot.
    pub const TYPES: &[&str] = &[
        "Grass", "Poison", "Fire", "Flying", "Water", "Bug", "Normal", "Electric", "Ground",
        "Fairy", "Fighting", "Psychic", "Rock", "Steel", "Ice", "Ghost", "Dragon", "Dark", "",
    ];

    /// Generate a type name.
    pub fn arb_type() -> impl Strategy<Value = &'static str> {
        prop::sample::select(TYPES)
    }

    /// Generate a Pokémon-like name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,11}"
    }

    /// Generate a collection with unique numbers, in arbitrary order.
    pub fn arb_collection(max_len: usize) -> impl Strategy<Value = RecordCollection> {
        prop::collection::btree_map(1i64..2000, (arb_name(), arb_type(), arb_type()), 0..max_len)
            .prop_map(|map| {
                map.into_iter()
                    .map(|(number, (name, type1, type2))| Record::new(number, name, type1, type2))
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
    }

    /// Generate an insert body that passes validation.
    pub fn arb_valid_draft() -> impl Strategy<Value = serde_json::Value> {
        (1i64..100_000, arb_name(), arb_type(), arb_type()).prop_filter_map(
            "type slots must be non-empty",
            |(number, name, type1, type2)| {
                (!type1.is_empty() && !type2.is_empty()).then(|| {
                    serde_json::json!({
                        "number": number,
                        "name": name,
                        "type1": type1,
                        "type2": type2,
                    })
                })
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    pub fn bulbasaur() -> Record {
        Record::new(1, "Bulbasaur", "Grass", "Poison")
    }

    pub fn charmander() -> Record {
        Record::new(4, "Charmander", "Fire", "")
    }

    pub fn pikachu() -> Record {
        Record::new(25, "Pikachu", "Electric", "")
    }

    /// Record used by the end-to-end CRUD flow.
    pub fn test_pokemon() -> Record {
        Record::new(6969, "cliftonTestPokemonWrong", "Flying", "Rock")
    }

    /// Small collection covering shared and empty type slots.
    pub fn starter_collection() -> RecordCollection {
        vec![
            bulbasaur(),
            charmander(),
            Record::new(7, "Squirtle", "Water", ""),
            Record::new(16, "Pidgey", "Normal", "Flying"),
            pikachu(),
        ]
    }

    /// Cache config with inline refresh and short deadlines, for deterministic tests.
    pub fn test_cache_config() -> CacheConfig {
        CacheConfig::new()
            .with_refresh_mode(RefreshMode::Inline)
            .with_read_timeout(Duration::from_millis(200))
            .with_write_timeout(Duration::from_millis(200))
    }

    /// Service over an in-memory store and an in-memory cache.
    pub fn memory_service(records: RecordCollection) -> (Arc<PokedexService>, Arc<InMemoryRecordStore>) {
        let store = Arc::new(InMemoryRecordStore::with_records(records));
        let config = test_cache_config();
        let cache = CacheAdapter::with_backend(Arc::new(InMemoryCacheBackend::new()), &config);
        let service = PokedexService::new(store.clone(), cache, config);
        (Arc::new(service), store)
    }

    /// Service over the given store and cache backend.
    pub fn service_with(
        store: Arc<dyn RecordStore>,
        backend: Arc<dyn CacheBackend>,
    ) -> Arc<PokedexService> {
        let config = test_cache_config();
        let cache = CacheAdapter::with_backend(backend, &config);
        Arc::new(PokedexService::new(store, cache, config))
    }

    /// JSON store in a fresh temp directory seeded with `records`.
    ///
    /// Keep the returned `TempDir` alive for as long as the store is used.
    pub fn json_store(records: &[Record]) -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("pokemonData.json");
        let body = serde_json::to_vec(records).expect("serialize fixture records");
        std::fs::write(&path, body).expect("write fixture file");
        (dir, JsonFileStore::new(path))
    }
}

// ============================================================================
// TESTS
// ============================================================================
