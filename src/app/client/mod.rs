//! HTTP client implementation for the remote product catalog
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with status classification
//! - `download`: Asset fetching with atomic writes

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::constants::catalog;
use crate::errors::{CatalogError, CatalogResult, ConfigResult};

pub mod config;
pub mod download;
pub mod http;

pub use config::ClientConfig;
pub use download::{AssetFetcher, HttpAssetFetcher};
pub use http::HttpHandler;

/// Endpoint locations for the catalog API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    /// Search API base URL (search, items and msds live below it)
    pub base_url: String,
    /// Base URL safety data sheet file names are appended to
    pub pdf_base_url: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            base_url: catalog::BASE_URL.to_string(),
            pdf_base_url: catalog::PDF_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    search_result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    products: Option<Vec<SearchProduct>>,
}

#[derive(Debug, Deserialize)]
struct SearchProduct {
    win: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct MsdsResponse {
    #[serde(default)]
    docs: Vec<MsdsDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MsdsDocument {
    msds_pdf_name: Option<String>,
}

/// HTTP client for the catalog search API
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http_handler: HttpHandler,
    endpoints: CatalogEndpoints,
}

impl CatalogClient {
    /// Creates a client for the default catalog endpoints
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        Self::with_endpoints(config, CatalogEndpoints::default())
    }

    /// Creates a client for custom endpoints
    pub fn with_endpoints(config: &ClientConfig, endpoints: CatalogEndpoints) -> ConfigResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!("Created catalog client for {}", endpoints.base_url);
        Ok(Self {
            http_handler: HttpHandler::new(client),
            endpoints,
        })
    }

    /// Asset fetcher sharing this client's connection pool and headers
    pub fn asset_fetcher(&self) -> HttpAssetFetcher {
        HttpAssetFetcher::new(self.http_handler.clone())
    }

    /// Endpoint locations in use
    pub fn endpoints(&self) -> &CatalogEndpoints {
        &self.endpoints
    }

    /// URL of one search results page
    ///
    /// `start` is the 1-based index of the first product on the page.
    pub fn search_page_url(&self, category: &str, start: u32, rows: u32) -> CatalogResult<Url> {
        self.endpoint_url(
            "search",
            &[
                ("fc", category),
                ("cr", &start.to_string()),
                ("rs", &rows.to_string()),
                ("st", "BM"),
                ("cmt", "ALT"),
                ("vc", "n"),
            ],
        )
    }

    /// URL of the detail record for one SKU
    pub fn item_detail_url(&self, sku: &str) -> CatalogResult<Url> {
        self.endpoint_url(
            "items",
            &[("vc", "n"), ("sgs", "Simple"), ("win", sku), ("re", "Detail")],
        )
    }

    /// URL of the safety data sheet search for one SKU
    pub fn msds_url(&self, sku: &str) -> CatalogResult<Url> {
        self.endpoint_url(
            "msds",
            &[
                ("q", sku),
                ("matchMode", "AND"),
                ("rows", &catalog::MSDS_ROWS.to_string()),
                ("start", "0"),
                ("vc", "n"),
            ],
        )
    }

    /// Download URL of a safety data sheet
    pub fn sds_pdf_url(&self, pdf_name: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.pdf_base_url.trim_end_matches('/'),
            pdf_name
        )
    }

    /// Fetches one search page and returns the product identifiers on it
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the page request fails or cannot be decoded
    pub async fn search_page(&self, url: &Url) -> CatalogResult<Vec<String>> {
        let response: SearchResponse = self.http_handler.get_json(url).await?;
        let identifiers = response
            .search_result
            .and_then(|result| result.products)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|product| product.win.as_ref().and_then(value_as_identifier))
            .collect();
        Ok(identifiers)
    }

    /// Fetches the detail record for one SKU
    ///
    /// Returns `Ok(None)` when the catalog has no item for the SKU.
    pub async fn item_detail(&self, sku: &str) -> CatalogResult<Option<Value>> {
        let url = self.item_detail_url(sku)?;
        let response: ItemsResponse = self.http_handler.get_json(&url).await?;
        Ok(response.items.into_iter().next())
    }

    /// Fetches the safety data sheet file names published for one SKU
    pub async fn sds_documents(&self, sku: &str) -> CatalogResult<Vec<String>> {
        let url = self.msds_url(sku)?;
        let response: MsdsResponse = self.http_handler.get_json(&url).await?;
        Ok(response
            .docs
            .into_iter()
            .filter_map(|doc| doc.msds_pdf_name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn endpoint_url(&self, endpoint: &str, query: &[(&str, &str)]) -> CatalogResult<Url> {
        let raw = format!("{}/{}", self.endpoints.base_url.trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&raw).map_err(|e| CatalogError::Decode {
            url: raw.clone(),
            reason: format!("invalid endpoint URL: {}", e),
        })?;
        url.query_pairs_mut().extend_pairs(query.iter());
        Ok(url)
    }
}

/// Identifiers arrive as strings or bare numbers
pub(crate) fn value_as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
