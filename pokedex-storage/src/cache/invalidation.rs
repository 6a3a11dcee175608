//! Write invalidation: overwrite the cached collection after a mutation.
//!
//! The refresh reloads the whole collection from the store and replaces the
//! cache entry unconditionally. Refreshes and read-path repopulation share
//! the [`WriteGeneration`] lock, so a refresh started after the last write
//! is also the last one to write the cache. Failure never reaches the
//! mutation's response.

use std::sync::Arc;
use std::time::Duration;

use super::adapter::CacheAdapter;
use super::config::{CacheConfig, RefreshMode};
use super::generation::WriteGeneration;
use crate::store::RecordStore;

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// What a refresh did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReport {
    /// The cache now mirrors the store.
    Refreshed { attempts: u32, count: usize },
    /// Refresh handed to a background task.
    Scheduled,
    /// No backend to refresh.
    Skipped,
    /// Every attempt failed.
    Failed { attempts: u32, reason: String },
}

/// Post-write cache refresher.
#[derive(Clone)]
pub struct WriteInvalidator {
    store: Arc<dyn RecordStore>,
    cache: CacheAdapter,
    config: Arc<CacheConfig>,
    generation: WriteGeneration,
}

impl WriteInvalidator {
    pub fn new(store: Arc<dyn RecordStore>, cache: CacheAdapter, config: CacheConfig) -> Self {
        Self {
            store,
            cache,
            config: Arc::new(config),
            generation: WriteGeneration::new(),
        }
    }

    /// Share the write generation used by the read path.
    pub fn with_generation(mut self, generation: WriteGeneration) -> Self {
        self.generation = generation;
        self
    }

    /// Reload from the store and overwrite the cache entry.
    ///
    /// Retries up to `refresh_attempts` times with a short linear backoff.
    pub async fn refresh(&self) -> RefreshReport {
        if !self.cache.is_active() {
            return RefreshReport::Skipped;
        }

        let _guard = self.generation.lock().await;
        let attempts = self.config.refresh_attempts.max(1);
        let key = &self.config.key;
        let mut reason = String::new();

        for attempt in 1..=attempts {
            match self.store.load().await {
                Ok(records) => {
                    if self.cache.put_collection(key, &records).await {
                        tracing::debug!(
                            key = %key,
                            count = records.len(),
                            attempt,
                            "Cache refreshed after write"
                        );
                        return RefreshReport::Refreshed {
                            attempts: attempt,
                            count: records.len(),
                        };
                    }
                    reason = "cache write failed".to_string();
                }
                Err(e) => reason = e.to_string(),
            }

            if attempt < attempts {
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
        }

        self.cache.record_refresh_failure();
        tracing::warn!(
            key = %key,
            attempts,
            reason = %reason,
            "Cache refresh after write failed, entry may be stale"
        );
        RefreshReport::Failed { attempts, reason }
    }

    /// Run the refresh according to the configured mode.
    pub async fn after_write(&self) -> RefreshReport {
        if !self.cache.is_active() {
            return RefreshReport::Skipped;
        }

        match self.config.refresh_mode {
            RefreshMode::Inline => self.refresh().await,
            RefreshMode::Background => {
                let this = self.clone();
                tokio::spawn(async move {
                    this.refresh().await;
                });
                RefreshReport::Scheduled
            }
        }
    }
}

impl std::fmt::Debug for WriteInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteInvalidator")
            .field("store", &self.store.location())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
