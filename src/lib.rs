//! Content fetch-and-cache store for a children's learning app.
//!
//! Mediates between the remote content API and UI screens: paginated
//! fetch-by-category, a persisted cache with size-bounded LRU eviction, and
//! session quiz-score tracking. Screens only ever talk to [`ContentStore`];
//! rendering, audio, and navigation live elsewhere.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sprout::{ApiClient, Category, ContentStore, FileStorage};
//!
//! # async fn demo() -> sprout::Result<()> {
//! let api = Arc::new(ApiClient::new("https://content.example.com")?);
//! let storage = Arc::new(FileStorage::open_default()?);
//! let store = ContentStore::load(api, storage).await;
//!
//! store.fetch_by_type(Category::Animal, true).await;
//! for item in store.items().await {
//!     println!("{}", item.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod storage;
pub mod store;

pub use api::{ApiClient, Category, ContentFetcher, ContentItem, ItemValue};
pub use cache::{CacheManager, MAX_CACHE_BYTES};
pub use error::{Result, SproutError};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{ContentState, ContentStore, DEFAULT_PAGE_SIZE, StoreConfig};
