//! Write generation: the ordering point between post-write refreshes and
//! read-path repopulation.
//!
//! The generation advances once per committed store write. Every cache write
//! of the collection happens under the shared lock, and a repopulation whose
//! snapshot was loaded under an older generation is dropped, so a slow read
//! can never overwrite the refresh that followed a write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Shared write counter plus the cache-write lock. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct WriteGeneration {
    current: Arc<AtomicU64>,
    cache_lock: Arc<Mutex<()>>,
}

impl WriteGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Record a committed write. Call after the store save succeeded.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Serialize a cache write of the collection.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.cache_lock.lock().await
    }
}
