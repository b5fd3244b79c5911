//! HTTP client for one REST collection.
//!
//! Talks to `{base}/api/{entity path}` and `{base}/api/{entity path}/{id}`.
//! Every call is a single attempt: no retries and no cancellation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, instrument, warn};

use super::auth::{bearer_header, NoToken, TokenProvider};
use super::error::{detail_message, ApiError, Result};
use super::store::RecordStore;
use crate::record::{Record, RecordId};

/// Client bound to a single entity collection.
///
/// Cheap to clone; clones share the connection pool and token provider.
#[derive(Debug, Clone)]
pub struct CollectionClient {
    /// The HTTP client.
    client: Client,
    /// `{base}/api/{entity path}` without a trailing slash.
    collection_url: String,
    /// Supplies the optional bearer token.
    tokens: Arc<dyn TokenProvider>,
}

impl CollectionClient {
    /// Create a client for `entity_path` under `base_url`, without authentication.
    pub fn new(base_url: &str, entity_path: &str) -> Result<Self> {
        Self::builder(base_url, entity_path).build()
    }

    /// Start building a client with a custom token provider or timeout.
    pub fn builder(base_url: &str, entity_path: &str) -> CollectionClientBuilder {
        CollectionClientBuilder {
            base_url: base_url.to_string(),
            entity_path: entity_path.to_string(),
            tokens: Arc::new(NoToken),
            timeout: None,
        }
    }

    /// The collection URL.
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// The URL of a single record.
    pub fn record_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    /// Attach common headers and the bearer token, if any.
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(header::ACCEPT, "application/json");
        match self.tokens.token() {
            Some(token) => request.header(header::AUTHORIZATION, bearer_header(&token)),
            None => request,
        }
    }

    /// Check the status and turn non-2xx responses into errors.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!("Error response body: {}", body);
        Err(error_from_response(status, &url, &body))
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl RecordStore for CollectionClient {
    #[instrument(skip(self), fields(url = %self.collection_url))]
    async fn list(&self) -> Result<Vec<Record>> {
        let response = self
            .prepare(self.client.get(&self.collection_url))
            .send()
            .await?;
        let records: Vec<Record> = Self::decode(Self::check(response).await?).await?;
        debug!("Fetched {} records", records.len());
        Ok(records)
    }

    #[instrument(skip(self, patch), fields(url = %self.collection_url, id = %id))]
    async fn update(&self, id: RecordId, patch: &Record) -> Result<Record> {
        let response = self
            .prepare(self.client.patch(self.record_url(id)))
            .json(patch)
            .send()
            .await?;
        let record: Record = Self::decode(Self::check(response).await?).await?;
        debug!("Record updated");
        Ok(record)
    }

    #[instrument(skip(self), fields(url = %self.collection_url, id = %id))]
    async fn remove(&self, id: RecordId) -> Result<()> {
        let response = self
            .prepare(self.client.delete(self.record_url(id)))
            .send()
            .await?;
        Self::check(response).await?;
        debug!("Record deleted");
        Ok(())
    }
}

/// Builder for `CollectionClient`.
#[derive(Debug)]
pub struct CollectionClientBuilder {
    base_url: String,
    entity_path: String,
    tokens: Arc<dyn TokenProvider>,
    timeout: Option<Duration>,
}

impl CollectionClientBuilder {
    /// Use `tokens` to authenticate requests.
    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Abort requests that take longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL is not http(s) or the
    /// entity path is empty, and `ApiError::Network` if the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> Result<CollectionClient> {
        let collection_url = collection_url(&self.base_url, &self.entity_path)?;

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Network)?;

        Ok(CollectionClient {
            client,
            collection_url,
            tokens: self.tokens,
        })
    }
}

/// Join the base URL and entity path into `{base}/api/{path}`.
fn collection_url(base_url: &str, entity_path: &str) -> Result<String> {
    let base = normalize_base_url(base_url);
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            base_url
        )));
    }

    let path = entity_path.trim_matches('/');
    if path.is_empty() {
        return Err(ApiError::InvalidUrl("entity path cannot be empty".to_string()));
    }

    Ok(format!("{}/api/{}", base, path))
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

/// Create an appropriate error from a non-2xx response.
fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
    let context = detail_message(body)
        .filter(|m| !m.is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| url.to_string());

    ApiError::from_status(status, &context)
}
