// Cache index manager.
// Tracks per-entry byte size and last-access time, and bounds total cache
// size with least-recently-used eviction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::Storage;

use super::keys::INDEX_KEY;

/// Default cache capacity ceiling: 50 MiB.
pub const MAX_CACHE_BYTES: u64 = 50 * 1024 * 1024;

/// Bookkeeping for one persisted cache blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Serialized byte length recorded when the key was first registered.
    pub size: u64,
    /// Millisecond timestamp of the most recent register of this key.
    pub last_access: i64,
}

/// Serialized index state: total size plus key -> entry map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheIndex {
    pub total_size: u64,
    pub files: HashMap<String, CacheEntry>,
}

/// Manages the cache index and enforces the capacity ceiling.
///
/// Callers only register writes; eviction happens behind the scenes. Every
/// operation reloads the index from storage and rewrites it in full after
/// mutation, so the index is durable across restarts. Storage failures are
/// logged and swallowed: cache bookkeeping must never fail the fetch that
/// triggered it.
pub struct CacheManager {
    storage: Arc<dyn Storage>,
    max_bytes: u64,
}

impl CacheManager {
    pub fn new(storage: Arc<dyn Storage>, max_bytes: u64) -> Self {
        Self { storage, max_bytes }
    }

    /// Record a write of `key` with the given serialized size, then enforce
    /// the capacity ceiling.
    ///
    /// A key seen for the first time adds its size to the running total; a
    /// re-registered key only refreshes its access time. The recorded size is
    /// deliberately not recomputed on re-register, so the total under-counts
    /// blobs that grow in place (see DESIGN.md).
    pub async fn register(&self, key: &str, size: u64) {
        self.register_at(key, size, Utc::now().timestamp_millis())
            .await;
    }

    pub(crate) async fn register_at(&self, key: &str, size: u64, now: i64) {
        let mut index = self.load_index().await;

        match index.files.get_mut(key) {
            Some(entry) => entry.last_access = now,
            None => {
                index.files.insert(
                    key.to_string(),
                    CacheEntry {
                        size,
                        last_access: now,
                    },
                );
                index.total_size += size;
            }
        }

        if let Err(err) = self.save_index(&index).await {
            warn!(key, %err, "failed to persist cache index");
        }

        self.enforce_limit().await;
    }

    /// Evict least-recently-used entries until the total size is under the
    /// ceiling (or the index is empty).
    pub async fn enforce_limit(&self) {
        let mut index = self.load_index().await;
        if index.total_size <= self.max_bytes {
            return;
        }

        let mut sorted: Vec<(String, CacheEntry)> = index
            .files
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        // Oldest first; key order makes timestamp ties deterministic.
        sorted.sort_by(|a, b| {
            a.1.last_access
                .cmp(&b.1.last_access)
                .then_with(|| a.0.cmp(&b.0))
        });

        for (key, entry) in sorted {
            if index.total_size <= self.max_bytes {
                break;
            }
            if let Err(err) = self.storage.remove(&key).await {
                warn!(%key, %err, "failed to evict cache blob");
                continue;
            }
            debug!(%key, size = entry.size, "evicted cache entry");
            index.total_size -= entry.size;
            index.files.remove(&key);
        }

        if let Err(err) = self.save_index(&index).await {
            warn!(%err, "failed to persist cache index after eviction");
        }
    }

    /// Current recorded total size across all entries.
    pub async fn total_size(&self) -> u64 {
        self.load_index().await.total_size
    }

    /// Number of tracked entries.
    pub async fn entry_count(&self) -> usize {
        self.load_index().await.files.len()
    }

    async fn load_index(&self) -> CacheIndex {
        match self.storage.get(INDEX_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%err, "cache index corrupted, starting fresh");
                CacheIndex::default()
            }),
            Ok(None) => CacheIndex::default(),
            Err(err) => {
                warn!(%err, "failed to load cache index");
                CacheIndex::default()
            }
        }
    }

    async fn save_index(&self, index: &CacheIndex) -> Result<()> {
        let raw = serde_json::to_string(index)?;
        self.storage.set(INDEX_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SproutError;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    fn manager(max_bytes: u64) -> (Arc<MemoryStorage>, CacheManager) {
        let storage = Arc::new(MemoryStorage::new());
        let cache = CacheManager::new(storage.clone(), max_bytes);
        (storage, cache)
    }

    #[tokio::test]
    async fn test_register_new_entry_adds_size() {
        let (_storage, cache) = manager(1000);

        cache.register_at("a", 100, 1).await;
        cache.register_at("b", 200, 2).await;

        assert_eq!(cache.total_size().await, 300);
        assert_eq!(cache.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_reregister_keeps_recorded_size() {
        let (_storage, cache) = manager(1000);

        cache.register_at("a", 100, 1).await;
        // Blob grew on disk, but the recorded size stays at 100.
        cache.register_at("a", 400, 2).await;

        assert_eq!(cache.total_size().await, 100);
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_index_durable_across_managers() {
        let storage = Arc::new(MemoryStorage::new());

        let cache = CacheManager::new(storage.clone(), 1000);
        cache.register_at("a", 100, 1).await;
        drop(cache);

        let cache = CacheManager::new(storage, 1000);
        assert_eq!(cache.total_size().await, 100);
    }

    #[tokio::test]
    async fn test_evicts_oldest_first() {
        let (storage, cache) = manager(250);

        storage.set("old", "blob").await.unwrap();
        storage.set("mid", "blob").await.unwrap();
        storage.set("new", "blob").await.unwrap();

        cache.register_at("old", 100, 1).await;
        cache.register_at("mid", 100, 2).await;
        // Third entry pushes the total to 300 and forces eviction.
        cache.register_at("new", 100, 3).await;

        assert_eq!(cache.total_size().await, 200);
        assert_eq!(storage.get("old").await.unwrap(), None);
        assert!(storage.get("mid").await.unwrap().is_some());
        assert!(storage.get("new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_touch_protects_from_eviction() {
        let (storage, cache) = manager(250);

        storage.set("a", "blob").await.unwrap();
        storage.set("b", "blob").await.unwrap();
        storage.set("c", "blob").await.unwrap();

        cache.register_at("a", 100, 1).await;
        cache.register_at("b", 100, 2).await;
        // Re-register refreshes "a", making "b" the oldest.
        cache.register_at("a", 100, 3).await;
        cache.register_at("c", 100, 4).await;

        assert_eq!(storage.get("b").await.unwrap(), None);
        assert!(storage.get("a").await.unwrap().is_some());
        assert!(storage.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_eviction_repeats_until_under_ceiling() {
        let (storage, cache) = manager(150);

        for (key, at) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            storage.set(key, "blob").await.unwrap();
            cache.register_at(key, 100, at).await;
        }

        // Only the newest entry fits under the 150-byte ceiling.
        assert_eq!(cache.total_size().await, 100);
        assert_eq!(cache.entry_count().await, 1);
        assert!(storage.get("d").await.unwrap().is_some());
        for key in ["a", "b", "c"] {
            assert_eq!(storage.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_timestamp_tie_broken_by_key() {
        let (storage, cache) = manager(150);

        storage.set("beta", "blob").await.unwrap();
        storage.set("alpha", "blob").await.unwrap();

        cache.register_at("beta", 100, 7).await;
        cache.register_at("alpha", 100, 7).await;

        assert_eq!(storage.get("alpha").await.unwrap(), None);
        assert!(storage.get("beta").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_under_ceiling_evicts_nothing() {
        let (storage, cache) = manager(1000);

        storage.set("a", "blob").await.unwrap();
        cache.register_at("a", 100, 1).await;
        cache.enforce_limit().await;

        assert_eq!(cache.total_size().await, 100);
        assert!(storage.get("a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupted_index_starts_fresh() {
        let (storage, cache) = manager(1000);

        storage.set(INDEX_KEY, "not json").await.unwrap();
        cache.register_at("a", 100, 1).await;

        assert_eq!(cache.total_size().await, 100);
    }

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn get(&self, _key: &str) -> crate::error::Result<Option<String>> {
            Err(SproutError::Storage("offline".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> crate::error::Result<()> {
            Err(SproutError::Storage("offline".to_string()))
        }

        async fn remove(&self, _key: &str) -> crate::error::Result<()> {
            Err(SproutError::Storage("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let cache = CacheManager::new(Arc::new(FailingStorage), 100);

        // Must not panic or surface an error.
        cache.register("a", 500).await;
        cache.enforce_limit().await;
    }
}
