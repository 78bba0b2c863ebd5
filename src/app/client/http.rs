//! Core HTTP operations for catalog requests
//!
//! This module wraps the shared reqwest client with typed JSON fetching and
//! status classification. Pacing between requests is the caller's concern.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{CatalogError, CatalogResult};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sends a GET request and returns the raw response
    ///
    /// Status codes are not inspected; streaming callers classify them.
    pub async fn get_response(&self, url: &Url) -> reqwest::Result<Response> {
        self.client.get(url.as_str()).send().await
    }

    /// Fetches a URL and decodes its JSON body
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails, the status is not a
    /// success, or the body does not decode into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> CatalogResult<T> {
        let response = self
            .get_response(url)
            .await
            .map_err(|source| CatalogError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| CatalogError::Http {
            url: url.to_string(),
            source,
        })?;

        let value = serde_json::from_slice(&body).map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Fetched JSON from {}", url);
        Ok(value)
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
