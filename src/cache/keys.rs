// Cache key construction.
// Fixed storage keys for the index and persisted stats, plus per-category
// content blob keys.

use crate::api::Category;

/// Prefix for per-category content blob keys.
pub const CACHE_PREFIX: &str = "content_cache_";

/// Storage key for the serialized cache index.
pub const INDEX_KEY: &str = "cache_index";

/// Storage key for the persisted subset of store state.
pub const STATS_KEY: &str = "content_stats";

/// Storage key for a category's cached content blob.
pub fn content_key(category: Category) -> String {
    format!("{CACHE_PREFIX}{category}")
}
