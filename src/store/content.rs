// Content store.
// Orchestrates paginated fetches against the content API, persists pages
// through the cache index, falls back to cached data on network failure, and
// tracks session quiz scores.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::api::{Category, ContentFetcher, ContentItem};
use crate::cache::{CacheManager, MAX_CACHE_BYTES, STATS_KEY, content_key};
use crate::storage::Storage;

use super::state::{ContentState, PersistedStats};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 26;

/// Store tuning knobs.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Page size used both for the request `limit` and for the
    /// short-page "no more pages" inference.
    pub page_size: u32,
    /// Cache capacity ceiling handed to the cache index.
    pub max_cache_bytes: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_cache_bytes: MAX_CACHE_BYTES,
        }
    }
}

/// Single source of truth for the currently loaded content and the session
/// quiz statistics.
///
/// At most one fetch is in flight per store instance; a `fetch_by_type` or
/// `fetch_more` call while another fetch is running returns immediately
/// without touching state. No operation surfaces an error: network failures
/// fall back to the cache, storage failures degrade to a cache-less session.
pub struct ContentStore {
    fetcher: Arc<dyn ContentFetcher>,
    storage: Arc<dyn Storage>,
    cache: CacheManager,
    state: RwLock<ContentState>,
    // Single-slot gate: holding it across the request is what makes
    // overlapping fetch calls no-ops.
    fetch_gate: Mutex<()>,
    page_size: u32,
}

impl ContentStore {
    /// Construct the store and restore the persisted stats, so consumers
    /// never read a flash of default scores.
    pub async fn load(fetcher: Arc<dyn ContentFetcher>, storage: Arc<dyn Storage>) -> Self {
        Self::load_with(fetcher, storage, StoreConfig::default()).await
    }

    /// Construct with explicit tuning knobs.
    pub async fn load_with(
        fetcher: Arc<dyn ContentFetcher>,
        storage: Arc<dyn Storage>,
        config: StoreConfig,
    ) -> Self {
        let cache = CacheManager::new(storage.clone(), config.max_cache_bytes);
        let store = Self {
            fetcher,
            storage,
            cache,
            state: RwLock::new(ContentState::default()),
            fetch_gate: Mutex::new(()),
            page_size: config.page_size,
        };
        store.restore_stats().await;
        store
    }

    /// Fetch page 1 for a category, replacing the current items.
    ///
    /// With `reset`, pagination state is cleared before the request. On
    /// network failure the last cached snapshot for the category is served
    /// instead (empty if none was ever cached).
    pub async fn fetch_by_type(&self, category: Category, reset: bool) {
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            return;
        };

        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.active_category = Some(category);
            if reset {
                state.items.clear();
                state.page = 1;
                state.has_more = true;
            }
        }

        match self.fetcher.fetch_page(category, 1, self.page_size).await {
            Ok(content) => {
                debug!(%category, count = content.len(), "fetched first page");
                self.persist_page(category, &content).await;

                let stats = {
                    let mut state = self.state.write().await;
                    state.has_more = content.len() == self.page_size as usize;
                    state.items = content;
                    state.page = 2;
                    state.loading = false;
                    *state.fetch_count.entry(category).or_insert(0) += 1;
                    PersistedStats::capture(&state)
                };
                self.persist_stats(&stats).await;
            }
            Err(err) => {
                warn!(%category, %err, "fetch failed, serving cached snapshot");
                let cached = self.read_cached(category).await;
                let mut state = self.state.write().await;
                state.items = cached;
                state.loading = false;
            }
        }
    }

    /// Fetch the next page for a category and append it to the current
    /// items.
    ///
    /// No-op while a fetch is in flight or after the last page was reached.
    /// On network failure state is left untouched.
    pub async fn fetch_more(&self, category: Category) {
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            return;
        };

        let page = {
            let mut state = self.state.write().await;
            if !state.has_more {
                return;
            }
            state.loading = true;
            state.page
        };

        match self.fetcher.fetch_page(category, page, self.page_size).await {
            Ok(new_items) => {
                debug!(%category, page, count = new_items.len(), "fetched next page");
                let fetched = new_items.len();
                let merged = {
                    let state = self.state.read().await;
                    let mut merged = state.items.clone();
                    merged.extend(new_items);
                    merged
                };
                // The full merged sequence is re-persisted under the same
                // key, so the blob grows with every page.
                self.persist_page(category, &merged).await;

                let stats = {
                    let mut state = self.state.write().await;
                    state.items = merged;
                    state.page += 1;
                    state.has_more = fetched == self.page_size as usize;
                    state.loading = false;
                    *state.fetch_count.entry(category).or_insert(0) += 1;
                    PersistedStats::capture(&state)
                };
                self.persist_stats(&stats).await;
            }
            Err(err) => {
                warn!(%category, page, %err, "fetch more failed");
                self.state.write().await.loading = false;
            }
        }
    }

    /// Pull-to-refresh: a reset fetch with the `refreshing` flag raised for
    /// its duration.
    pub async fn refresh(&self, category: Category) {
        self.state.write().await.refreshing = true;
        self.fetch_by_type(category, true).await;
        self.state.write().await.refreshing = false;
    }

    /// Record a quiz answer.
    pub async fn track_answer(&self, is_correct: bool) {
        let stats = {
            let mut state = self.state.write().await;
            state.completed_count += 1;
            if is_correct {
                state.correct_count += 1;
            } else {
                state.wrong_count += 1;
            }
            PersistedStats::capture(&state)
        };
        self.persist_stats(&stats).await;
    }

    /// Raise the high score if `score` beats it.
    pub async fn update_high_score(&self, score: u32) {
        let stats = {
            let mut state = self.state.write().await;
            state.high_score = state.high_score.max(score);
            PersistedStats::capture(&state)
        };
        self.persist_stats(&stats).await;
    }

    /// Remember the last scroll position for a category.
    pub async fn set_scroll_offset(&self, category: Category, offset: f64) {
        let stats = {
            let mut state = self.state.write().await;
            state.scroll_offsets.insert(category, offset);
            PersistedStats::capture(&state)
        };
        self.persist_stats(&stats).await;
    }

    /// Zero the answer counters. The high score is kept.
    pub async fn reset_scores(&self) {
        let stats = {
            let mut state = self.state.write().await;
            state.completed_count = 0;
            state.correct_count = 0;
            state.wrong_count = 0;
            PersistedStats::capture(&state)
        };
        self.persist_stats(&stats).await;
    }

    /// Drop the loaded items and reset pagination.
    pub async fn clear_items(&self) {
        let mut state = self.state.write().await;
        state.items.clear();
        state.page = 1;
        state.has_more = true;
    }

    // ---- reads ----

    /// Clone of the full current state.
    pub async fn snapshot(&self) -> ContentState {
        self.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.read().await.items.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn is_refreshing(&self) -> bool {
        self.state.read().await.refreshing
    }

    pub async fn has_more(&self) -> bool {
        self.state.read().await.has_more
    }

    pub async fn active_category(&self) -> Option<Category> {
        self.state.read().await.active_category
    }

    pub async fn completed_count(&self) -> u32 {
        self.state.read().await.completed_count
    }

    pub async fn correct_count(&self) -> u32 {
        self.state.read().await.correct_count
    }

    pub async fn wrong_count(&self) -> u32 {
        self.state.read().await.wrong_count
    }

    pub async fn high_score(&self) -> u32 {
        self.state.read().await.high_score
    }

    /// Last remembered scroll position for a category (0 if never set).
    pub async fn scroll_offset(&self, category: Category) -> f64 {
        self.state
            .read()
            .await
            .scroll_offsets
            .get(&category)
            .copied()
            .unwrap_or(0.0)
    }

    /// Number of successful fetches recorded for a category.
    pub async fn fetch_count(&self, category: Category) -> u32 {
        self.state
            .read()
            .await
            .fetch_count
            .get(&category)
            .copied()
            .unwrap_or(0)
    }

    // ---- persistence helpers ----

    async fn persist_page(&self, category: Category, items: &[ContentItem]) {
        let key = content_key(category);
        let blob = match serde_json::to_string(items) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(%key, %err, "failed to serialize content page");
                return;
            }
        };
        if let Err(err) = self.storage.set(&key, &blob).await {
            warn!(%key, %err, "failed to persist content page");
            return;
        }
        self.cache.register(&key, blob.len() as u64).await;
    }

    async fn read_cached(&self, category: Category) -> Vec<ContentItem> {
        let key = content_key(category);
        match self.storage.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(%key, %err, "cached content corrupted");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%key, %err, "failed to read cached content");
                Vec::new()
            }
        }
    }

    async fn restore_stats(&self) {
        match self.storage.get(STATS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedStats>(&raw) {
                Ok(stats) => stats.apply(&mut *self.state.write().await),
                Err(err) => warn!(%err, "persisted stats corrupted, starting fresh"),
            },
            Ok(None) => {}
            Err(err) => warn!(%err, "failed to restore persisted stats"),
        }
    }

    async fn persist_stats(&self, stats: &PersistedStats) {
        let raw = match serde_json::to_string(stats) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "failed to serialize stats");
                return;
            }
        };
        if let Err(err) = self.storage.set(STATS_KEY, &raw).await {
            warn!(%err, "failed to persist stats");
        }
    }
}
