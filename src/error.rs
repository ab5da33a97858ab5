// Error types for the sprout content store.
// Covers content API errors, storage errors, and serialization errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SproutError {
    #[error("content API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("content API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, SproutError>;
