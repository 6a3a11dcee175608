//! Fault-injecting doubles shared by this crate's unit tests.
//!
//! `pokedex-test-utils` depends on this crate, so its doubles cannot be used here.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pokedex_core::{CacheError, Record, RecordCollection, StoreError};
use tokio::sync::Notify;

use crate::cache::{CacheBackend, InMemoryCacheBackend};
use crate::store::{InMemoryRecordStore, RecordStore};

pub fn bulbasaur() -> Record {
    Record::new(1, "Bulbasaur", "Grass", "Poison")
}

pub fn charmander() -> Record {
    Record::new(4, "Charmander", "Fire", "")
}

/// Backend that sleeps before every command.
pub struct SlowBackend {
    pub delay: Duration,
    pub inner: InMemoryCacheBackend,
}

impl SlowBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: InMemoryCacheBackend::new(),
        }
    }
}

#[async_trait]
impl CacheBackend for SlowBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value, ttl).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn endpoint(&self) -> String {
        "slow".to_string()
    }
}

/// Backend whose writes fail a set number of times before succeeding.
/// Reads always fail when `reads_fail` is set.
#[derive(Default)]
pub struct FlakyBackend {
    pub inner: InMemoryCacheBackend,
    pub failing_writes: AtomicU32,
    pub write_attempts: AtomicU32,
    pub reads_fail: bool,
}

impl FlakyBackend {
    pub fn failing_writes(count: u32) -> Self {
        Self {
            failing_writes: AtomicU32::new(count),
            ..Default::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            failing_writes: AtomicU32::new(u32::MAX),
            reads_fail: true,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for FlakyBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.reads_fail {
            return Err(CacheError::Connection {
                endpoint: "flaky".to_string(),
                reason: "connection reset by peer".to_string(),
            });
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.failing_writes.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(CacheError::Command {
                reason: "READONLY You can't write against a read only replica.".to_string(),
            });
        }
        self.inner.set(key, value, ttl).await
    }

    async fn ping(&self) -> Result<(), CacheError> {
        if self.reads_fail {
            Err(CacheError::Command {
                reason: "LOADING".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn endpoint(&self) -> String {
        "flaky".to_string()
    }
}

/// Store that fails reads, writes, or both, around an in-memory store.
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryRecordStore,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl FailingStore {
    pub fn unreadable() -> Self {
        Self {
            fail_load: true,
            ..Default::default()
        }
    }

    pub fn read_only(records: RecordCollection) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(records),
            fail_save: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn load(&self) -> Result<RecordCollection, StoreError> {
        if self.fail_load {
            return Err(StoreError::Read {
                location: self.location(),
                reason: "permission denied".to_string(),
            });
        }
        self.inner.load().await
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::Write {
                location: self.location(),
                reason: "no space left on device".to_string(),
            });
        }
        self.inner.save(records).await
    }

    fn location(&self) -> String {
        "failing".to_string()
    }
}

/// Store whose next `load` can be held open after taking its snapshot.
#[derive(Default)]
pub struct GatedStore {
    pub inner: InMemoryRecordStore,
    armed: AtomicBool,
    held: Notify,
    released: Notify,
}

impl GatedStore {
    pub fn new(records: RecordCollection) -> Self {
        Self {
            inner: InMemoryRecordStore::with_records(records),
            ..Default::default()
        }
    }

    /// Hold the next `load` until [`release`](Self::release).
    pub fn hold_next_load(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub async fn wait_until_held(&self) {
        self.held.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn load(&self) -> Result<RecordCollection, StoreError> {
        let snapshot = self.inner.load().await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.held.notify_one();
            self.released.notified().await;
        }
        Ok(snapshot)
    }

    async fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        self.inner.save(records).await
    }

    fn location(&self) -> String {
        "gated".to_string()
    }
}
