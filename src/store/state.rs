// Store state types.
// The observable state snapshot and its persisted subset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::{Category, ContentItem};

/// Observable store state.
///
/// Mutation goes exclusively through `ContentStore` operations; consumers
/// read clones of this via the store's getters.
#[derive(Debug, Clone)]
pub struct ContentState {
    /// Content for the active category, in page order.
    pub items: Vec<ContentItem>,
    pub loading: bool,
    pub refreshing: bool,
    pub active_category: Option<Category>,
    /// Next page number to fetch (1-based).
    pub page: u32,
    pub has_more: bool,

    pub completed_count: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub high_score: u32,

    /// Last scroll position per category.
    pub scroll_offsets: HashMap<Category, f64>,
    /// Number of successful fetches per category, kept for instrumentation.
    pub fetch_count: HashMap<Category, u32>,
}

impl Default for ContentState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            refreshing: false,
            active_category: None,
            page: 1,
            has_more: true,
            completed_count: 0,
            correct_count: 0,
            wrong_count: 0,
            high_score: 0,
            scroll_offsets: HashMap::new(),
            fetch_count: HashMap::new(),
        }
    }
}

/// The subset of store state that survives restarts.
///
/// Saved under a fixed storage key after every mutation of one of its fields
/// and restored when the store is constructed. `items`, `page`, `has_more`
/// and the transient flags are rebuilt by the next fetch instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedStats {
    pub completed_count: u32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub high_score: u32,
    #[serde(default)]
    pub scroll_offsets: HashMap<Category, f64>,
    #[serde(default)]
    pub fetch_count: HashMap<Category, u32>,
}

impl PersistedStats {
    /// Snapshot the persisted fields out of the full state.
    pub fn capture(state: &ContentState) -> Self {
        Self {
            completed_count: state.completed_count,
            correct_count: state.correct_count,
            wrong_count: state.wrong_count,
            high_score: state.high_score,
            scroll_offsets: state.scroll_offsets.clone(),
            fetch_count: state.fetch_count.clone(),
        }
    }

    /// Overlay these stats onto a (freshly constructed) state.
    pub fn apply(self, state: &mut ContentState) {
        state.completed_count = self.completed_count;
        state.correct_count = self.correct_count;
        state.wrong_count = self.wrong_count;
        state.high_score = self.high_score;
        state.scroll_offsets = self.scroll_offsets;
        state.fetch_count = self.fetch_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = ContentState::default();
        assert!(state.items.is_empty());
        assert!(!state.loading);
        assert_eq!(state.page, 1);
        assert!(state.has_more);
        assert_eq!(state.active_category, None);
        assert_eq!(state.high_score, 0);
    }

    #[test]
    fn test_capture_apply_round_trip() {
        let mut state = ContentState::default();
        state.completed_count = 10;
        state.correct_count = 7;
        state.wrong_count = 3;
        state.high_score = 9;
        state.scroll_offsets.insert(Category::Animal, 412.5);
        state.fetch_count.insert(Category::Letter, 2);

        let stats = PersistedStats::capture(&state);

        let mut restored = ContentState::default();
        stats.apply(&mut restored);

        assert_eq!(restored.completed_count, 10);
        assert_eq!(restored.correct_count, 7);
        assert_eq!(restored.wrong_count, 3);
        assert_eq!(restored.high_score, 9);
        assert_eq!(restored.scroll_offsets.get(&Category::Animal), Some(&412.5));
        assert_eq!(restored.fetch_count.get(&Category::Letter), Some(&2));
    }

    #[test]
    fn test_stats_serde_round_trip() {
        let mut stats = PersistedStats {
            completed_count: 4,
            correct_count: 3,
            wrong_count: 1,
            high_score: 6,
            ..PersistedStats::default()
        };
        stats.scroll_offsets.insert(Category::Fruit, 88.0);
        stats.fetch_count.insert(Category::Division, 5);

        let json = serde_json::to_string(&stats).unwrap();
        let back: PersistedStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }

    #[test]
    fn test_stats_tolerate_missing_maps() {
        // Stats written by an older build may lack the map fields.
        let back: PersistedStats = serde_json::from_str(
            r#"{"completed_count": 1, "correct_count": 1, "wrong_count": 0, "high_score": 2}"#,
        )
        .unwrap();
        assert_eq!(back.completed_count, 1);
        assert!(back.scroll_offsets.is_empty());
        assert!(back.fetch_count.is_empty());
    }
}
