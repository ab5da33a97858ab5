// Content API HTTP client.
// Handles request construction, status checking, and response decoding.

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{Result, SproutError};

use super::types::{Category, ContentItem, ContentResponse};

/// Abstraction over "fetch one page of content" so the store can be driven
/// by the real API client or a scripted stand-in.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch one page of content for a category. `page` is 1-based.
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ContentItem>>;
}

/// HTTP client for the remote content API.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("sprout-store"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(SproutError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of content for a category.
    pub async fn get_content(
        &self,
        category: Category,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ContentItem>> {
        let url = format!("{}/api/v1/content/", self.base_url);
        let params = [
            ("type", category.as_str().to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(SproutError::Api)?;

        let response = check_response(response).await?;
        let wrapper: ContentResponse = response.json().await?;
        Ok(wrapper.content)
    }
}

#[async_trait]
impl ContentFetcher for ApiClient {
    async fn fetch_page(
        &self,
        category: Category,
        page: u32,
        limit: u32,
    ) -> Result<Vec<ContentItem>> {
        self.get_content(category, page, limit).await
    }
}

/// Check response status and convert non-2xx responses to errors.
async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(SproutError::Status {
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}
