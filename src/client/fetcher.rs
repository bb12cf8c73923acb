//! Read-through fetcher
//!
//! Consults the cache before every request and stores successful response
//! bodies for subsequent lookups.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::Cache;
use crate::error::{FetchError, Result};

/// HTTP client that serves repeated requests from a [`Cache`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    cache: Cache,
}

impl Fetcher {
    /// Creates a fetcher backed by `cache`, with a per-request `timeout`.
    pub fn new(cache: Cache, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, cache })
    }

    /// Returns the cache this fetcher reads through.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Returns the raw body for `url`, from the cache when possible.
    ///
    /// Only successful responses are cached. A 404 is reported as
    /// [`FetchError::NotFound`], any other non-success status as
    /// [`FetchError::Status`].
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.is_empty() {
            return Err(FetchError::InvalidUrl("URL cannot be empty".to_string()));
        }

        if let Some(body) = self.cache.get(url) {
            return Ok(body);
        }

        debug!("Cache miss, fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        // Status wins over a failed body read
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?.to_vec();
        self.cache.add(url, body.clone());
        Ok(body)
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// A body that fails to decode stays cached; the caller gets the same
    /// error until the entry is reaped.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetch(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
