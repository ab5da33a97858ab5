// Content API module.
// Typed client and wire types for the remote content service.

pub mod client;
pub mod types;

pub use client::{ApiClient, ContentFetcher};
pub use types::{Category, ContentItem, ContentResponse, ItemValue};
