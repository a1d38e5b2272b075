//! Zotero Web API client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - Transparent paging for listings
//!
//! The same client talks to api.zotero.org and to the local API of Zotero 7 desktop.

mod query;

pub use query::ItemQuery;

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult, ConfigError};
use crate::models::{Collection, FullText, Item, SearchCondition, Tag, TagEntry, WriteResponse};

/// Header carrying the library version on every response.
const LAST_MODIFIED_VERSION: &str = "Last-Modified-Version";

/// Header for optimistic concurrency on writes.
const IF_UNMODIFIED_SINCE_VERSION: &str = "If-Unmodified-Since-Version";

/// Zotero API client bound to one library.
#[derive(Clone)]
pub struct ZoteroClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Library URL prefix (`{base}/users/{id}`).
    library_url: String,

    /// Whether an API key is sent.
    has_api_key: bool,

    /// Local desktop API mode.
    local: bool,
}

impl ZoteroClient {
    /// Build an authenticated handle from the configuration.
    ///
    /// Fails fast with [`ConfigError::MissingCredentials`] when remote mode lacks a library id or
    /// API key.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert("Zotero-API-Version", HeaderValue::from_static(api::API_VERSION));

        let send_key = !config.local && config.api_key.is_some();
        if send_key {
            if let Some(ref key) = config.api_key {
                // Bearer auth is stripped by reqwest on cross-origin redirects (file downloads).
                let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                    .map_err(|_| ConfigError::InvalidApiKey)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            library_url: config.library_url(),
            has_api_key: send_key,
            local: config.local,
        })
    }

    /// Check if an API key is sent with requests.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.has_api_key
    }

    /// Check if this client talks to the local desktop API.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.local
    }

    /// Library URL prefix.
    #[must_use]
    pub fn library_url(&self) -> &str {
        &self.library_url
    }

    /// Get a single item by key.
    pub async fn get_item(&self, key: &str) -> ClientResult<Item> {
        let url = format!("{}/items/{}", self.library_url, key);
        self.get(&url, &[]).await
    }

    /// Get the child attachments and notes of an item, in API order.
    pub async fn get_children(&self, key: &str) -> ClientResult<Vec<Item>> {
        let url = format!("{}/items/{}/children", self.library_url, key);
        self.get_paged(&url, &[], None).await
    }

    /// Get child notes of an item.
    pub async fn list_item_notes(&self, key: &str, limit: Option<u32>) -> ClientResult<Vec<Item>> {
        let url = format!("{}/items/{}/children", self.library_url, key);
        let params = vec![("itemType".to_string(), crate::models::NOTE.to_string())];
        self.get_paged(&url, &params, limit).await
    }

    /// List items matching a query.
    pub async fn list_items(&self, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        let url = format!("{}/items", self.library_url);
        self.get_paged(&url, &query.to_params(), query.limit).await
    }

    /// Get the full-text index entry of an attachment.
    ///
    /// Returns [`ClientError::NotFound`] when the attachment has not been indexed.
    pub async fn get_fulltext(&self, attachment_key: &str) -> ClientResult<FullText> {
        let url = format!("{}/items/{}/fulltext", self.library_url, attachment_key);
        self.get(&url, &[]).await
    }

    /// Download an attachment's file to `dest`, returning the number of bytes written.
    ///
    /// Returns [`ClientError::NotFound`] when the library holds no file for the attachment.
    pub async fn download_attachment(&self, attachment_key: &str, dest: &Path) -> ClientResult<u64> {
        let url = format!("{}/items/{}/file", self.library_url, attachment_key);
        tracing::debug!(url = %url, dest = %dest.display(), "Downloading attachment");

        let response = self.client.get(&url).send().await?;
        let response = self.handle_response(response).await?;
        let bytes = response.bytes().await?;

        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }

    /// List collections; all of them when `limit` is `None`.
    pub async fn list_collections(&self, limit: Option<u32>) -> ClientResult<Vec<Collection>> {
        let url = format!("{}/collections", self.library_url);
        self.get_paged(&url, &[], limit).await
    }

    /// Get a single collection.
    pub async fn get_collection(&self, key: &str) -> ClientResult<Collection> {
        let url = format!("{}/collections/{}", self.library_url, key);
        self.get(&url, &[]).await
    }

    /// List items in a collection.
    pub async fn collection_items(&self, key: &str, limit: Option<u32>) -> ClientResult<Vec<Item>> {
        let url = format!("{}/collections/{}/items", self.library_url, key);
        self.get_paged(&url, &[], limit).await
    }

    /// List tags; all of them when `limit` is `None`.
    pub async fn list_tags(&self, limit: Option<u32>) -> ClientResult<Vec<TagEntry>> {
        let url = format!("{}/tags", self.library_url);
        self.get_paged(&url, &[], limit).await
    }

    /// Replace an item's tags.
    ///
    /// Sends the item's version so concurrent edits fail with
    /// [`ClientError::PreconditionFailed`] instead of being overwritten.
    pub async fn update_item_tags(&self, item: &Item, tags: &[Tag]) -> ClientResult<()> {
        let url = format!("{}/items/{}", self.library_url, item.key());
        let body = serde_json::to_string(&serde_json::json!({ "tags": tags }))?;

        let response = self
            .client
            .patch(&url)
            .header(IF_UNMODIFIED_SINCE_VERSION, item.version.to_string())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        self.handle_response(response).await?;
        Ok(())
    }

    /// Create items (notes, attachments, regular items).
    pub async fn create_items(&self, items: &[serde_json::Value]) -> ClientResult<WriteResponse> {
        let url = format!("{}/items", self.library_url);
        let (response, _) = self.post(&url, &serde_json::Value::from(items.to_vec())).await?;
        Ok(response)
    }

    /// Create a saved search, returning the write response and the new library version.
    pub async fn create_saved_search(
        &self,
        name: &str,
        conditions: &[SearchCondition],
    ) -> ClientResult<(WriteResponse, Option<u64>)> {
        let url = format!("{}/searches", self.library_url);
        let body = serde_json::json!([{ "name": name, "conditions": conditions }]);
        self.post(&url, &body).await
    }

    /// Items matching a saved search.
    pub async fn saved_search_items(&self, search_key: &str, query: &ItemQuery) -> ClientResult<Vec<Item>> {
        let url = format!("{}/searches/{}/items", self.library_url, search_key);
        self.get_paged(&url, &query.to_params(), query.limit).await
    }

    /// Delete saved searches.
    pub async fn delete_saved_searches(
        &self,
        keys: &[String],
        library_version: Option<u64>,
    ) -> ClientResult<()> {
        let url = format!("{}/searches", self.library_url);
        let params = vec![("searchKey".to_string(), keys.join(","))];

        let mut request = self.client.delete(&url).query(&params);
        if let Some(version) = library_version {
            request = request.header(IF_UNMODIFIED_SINCE_VERSION, version.to_string());
        }

        let response = request.send().await?;
        self.handle_response(response).await?;
        Ok(())
    }

    /// Make a GET request.
    async fn get<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).query(params).send().await?;
        let response = self.handle_response(response).await?;
        let value: serde_json::Value = response.json().await?;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// Make GET requests page by page until `limit` items or the end of the listing.
    async fn get_paged<T>(
        &self,
        url: &str,
        params: &[(String, String)],
        limit: Option<u32>,
    ) -> ClientResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut results: Vec<T> = Vec::new();
        let mut start: u32 = 0;

        loop {
            let remaining = limit.map(|l| l.saturating_sub(results.len() as u32));
            let page_size = remaining.map_or(api::PAGE_SIZE, |r| r.min(api::PAGE_SIZE));
            if page_size == 0 {
                break;
            }

            let mut page_params = params.to_vec();
            page_params.push(("start".to_string(), start.to_string()));
            page_params.push(("limit".to_string(), page_size.to_string()));

            let page: Vec<T> = self.get(url, &page_params).await?;
            let fetched = page.len() as u32;
            results.extend(page);
            start += fetched;

            if fetched < page_size {
                break;
            }
        }

        Ok(results)
    }

    /// Make a POST request with a JSON body, returning the library version header too.
    async fn post<T>(&self, url: &str, body: &serde_json::Value) -> ClientResult<(T, Option<u64>)>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(url = %url, "POST");

        let body_str = serde_json::to_string(body)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body_str)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let version = response
            .headers()
            .get(LAST_MODIFIED_VERSION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let value: serde_json::Value = response.json().await?;

        Ok((serde_json::from_value(value)?, version))
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .or_else(|| response.headers().get("Backoff"))
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let resource = response.url().path().to_string();
                Err(ClientError::not_found(resource))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::Forbidden { message: text })
            }
            412 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::PreconditionFailed { message: text })
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for ZoteroClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoteroClient")
            .field("library_url", &self.library_url)
            .field("has_api_key", &self.has_api_key())
            .field("local", &self.local)
            .finish()
    }
}
