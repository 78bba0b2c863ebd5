//! Core application logic for Catalog Fetcher
//!
//! This module contains the catalog client, data models, catalog extraction,
//! the durable progress record and the resumable download manager.
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_fetcher::app::{CatalogClient, CatalogExtractor, ClientConfig, ExtractorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CatalogClient::new(&ClientConfig::default())?;
//! let extractor = CatalogExtractor::new(client, ExtractorConfig::default());
//!
//! let work_set = extractor.list_work_items().await?;
//! for item in &work_set {
//!     println!("{} -> {}", item.identifier, item.source_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod manager;
pub mod models;
pub mod progress;

// Re-export main public API
pub use catalog::{CatalogExtractor, ExtractorConfig, ScrapeResult};
pub use client::{
    AssetFetcher, CatalogClient, CatalogEndpoints, ClientConfig, HttpAssetFetcher, HttpHandler,
};
pub use manager::{
    create_shutdown_channel, DownloadEvent, DownloadManager, DownloadSummary, FailedItem,
    ManagerConfig, RunStatus, SignalHandler,
};
pub use models::{
    DownloadOutcome, ImageDataset, ImageRecord, ProductDataset, ProductRecord, SkipReason,
    WorkItem, WorkSet,
};
pub use progress::ProgressStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert!(ManagerConfig::default().validate().is_ok());
    }
}
