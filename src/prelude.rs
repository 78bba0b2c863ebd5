//! Prelude module for Catalog Fetcher Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use catalog_fetcher::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use catalog_fetcher::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let fetcher = HttpAssetFetcher::from_config(&ClientConfig::default())?;
//!     let store = ProgressStore::new("data/list/download_progress.json");
//!     let mut manager = DownloadManager::new(ManagerConfig::new("downloads/list"), store, fetcher);
//!
//!     let summary = manager.run_with_seed(WorkSet::new()).await?;
//!     assert!(summary.is_complete());
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, FetchError, Result};

// Download engine
pub use crate::app::{
    AssetFetcher, DownloadEvent, DownloadManager, DownloadOutcome, DownloadSummary,
    HttpAssetFetcher, ManagerConfig, ProgressStore, RunStatus, WorkItem, WorkSet,
};

// Catalog access
pub use crate::app::{
    CatalogClient, CatalogEndpoints, CatalogExtractor, ClientConfig, ExtractorConfig,
    ImageDataset, ProductDataset,
};
