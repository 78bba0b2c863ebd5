//! Catalog extraction
//!
//! The extractor walks every category in the categories file, pages through
//! the search API to collect product identifiers, and fetches one detail
//! record per identifier. Failed pages and failed detail lookups are logged
//! and skipped; only conditions that make the whole listing meaningless abort.
//!
//! - [`categories`] - Categories file parsing and page offsets
//! - [`transform`] - Detail record projection
//! - [`sources`] - Work sets derived from files and datasets

pub mod categories;
pub mod sources;
pub mod transform;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::app::client::CatalogClient;
use crate::app::models::{
    CategorySpec, ImageDataset, ImageRecord, ProductDataset, ProductRecord, WorkSet,
};
use crate::constants::{catalog, files, jobs, limits};
use crate::errors::{CatalogError, CatalogResult};

pub use sources::{
    load_image_dataset, load_product_dataset, work_set_from_documents, work_set_from_file,
    work_set_from_images, write_dataset,
};

/// Extractor settings
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Text file of `<categoryNumber>,<totalProducts>` lines
    pub categories_file: PathBuf,
    /// Where `product_data.json` and `image_data.json` are written
    pub data_dir: PathBuf,
    /// Products per search page
    pub page_size: u32,
    /// Pause after each search page and each detail request
    pub request_delay: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            categories_file: PathBuf::from(files::CATEGORIES_FILE),
            data_dir: PathBuf::from(jobs::DEFAULT_DATA_DIR),
            page_size: catalog::PRODUCTS_PER_PAGE,
            request_delay: Duration::from_millis(limits::DEFAULT_DETAIL_DELAY_MS),
        }
    }
}

impl ExtractorConfig {
    /// Set the categories file
    pub fn with_categories_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.categories_file = path.into();
        self
    }

    /// Set the dataset directory
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Set the pause between catalog requests
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Path of the product dataset
    pub fn product_data_path(&self) -> PathBuf {
        self.data_dir.join(files::PRODUCT_DATA_FILE)
    }

    /// Path of the image dataset
    pub fn image_data_path(&self) -> PathBuf {
        self.data_dir.join(files::IMAGE_DATA_FILE)
    }
}

/// Result of a full catalog scrape
#[derive(Debug, Clone, Default)]
pub struct ScrapeResult {
    pub products: ProductDataset,
    pub images: ImageDataset,
    /// Search pages requested
    pub pages_requested: usize,
    /// Search pages that failed
    pub pages_failed: usize,
}

/// Lists catalog items by category
pub struct CatalogExtractor {
    client: CatalogClient,
    config: ExtractorConfig,
}

impl CatalogExtractor {
    /// Create an extractor over `client`
    pub fn new(client: CatalogClient, config: ExtractorConfig) -> Self {
        Self { client, config }
    }

    /// Extractor settings
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Main image URL of every listed product, keyed by SKU
    ///
    /// # Errors
    ///
    /// Same conditions as [`CatalogExtractor::scrape`]
    pub async fn list_work_items(&self) -> CatalogResult<WorkSet> {
        let result = self.scrape().await?;

        let mut work_set = WorkSet::new();
        for record in &result.images.images {
            if record.sku != catalog::NOT_AVAILABLE && record.image.url != catalog::NOT_AVAILABLE {
                work_set.insert_if_absent(record.sku.clone(), record.image.url.clone());
            }
        }

        info!("Listed {} downloadable items", work_set.len());
        Ok(work_set)
    }

    /// Scrape product and image records for every category
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the categories file is unreadable or empty,
    /// or if every search page request failed
    pub async fn scrape(&self) -> CatalogResult<ScrapeResult> {
        let categories = categories::read_categories(&self.config.categories_file)?;
        let mut result = ScrapeResult::default();
        let mut products = Vec::new();
        let mut images = Vec::new();

        for category in &categories {
            info!(
                "Processing category {} ({} products)",
                category.category_number, category.total_products
            );

            let skus = self.collect_identifiers(category, &mut result).await;
            info!(
                "Found {} SKUs in category {}",
                skus.len(),
                category.category_number
            );

            for sku in skus {
                if let Some((mut product, mut image)) = self.fetch_detail(&sku).await {
                    product.category_number = Some(category.category_number.clone());
                    image.category_number = category.category_number.clone();
                    products.push(product);
                    images.push(image);
                }
                self.pause().await;
            }
        }

        if result.pages_requested > 0 && result.pages_failed == result.pages_requested {
            return Err(CatalogError::AllPagesFailed {
                pages: result.pages_requested,
            });
        }

        result.products = ProductDataset::new(products);
        result.images = ImageDataset::new(images);
        info!(
            "Scraped {} products from {} categories",
            result.products.total_items,
            categories.len()
        );
        Ok(result)
    }

    /// Delete dataset files left by a previous scrape
    pub fn remove_stale_datasets(&self) -> CatalogResult<()> {
        for path in [self.config.product_data_path(), self.config.image_data_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => info!("Removed existing {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(CatalogError::DatasetIo { path, source }),
            }
        }
        Ok(())
    }

    /// Write both datasets into the data directory
    ///
    /// Returns the product and image dataset paths.
    pub fn write_datasets(&self, result: &ScrapeResult) -> CatalogResult<(PathBuf, PathBuf)> {
        self.remove_stale_datasets()?;

        let product_path = self.config.product_data_path();
        let image_path = self.config.image_data_path();
        write_dataset(&product_path, &result.products)?;
        write_dataset(&image_path, &result.images)?;

        info!(
            "Data saved to {} and {}",
            product_path.display(),
            image_path.display()
        );
        Ok((product_path, image_path))
    }

    async fn collect_identifiers(
        &self,
        category: &CategorySpec,
        result: &mut ScrapeResult,
    ) -> Vec<String> {
        let mut identifiers = Vec::new();
        let starts = categories::page_starts(category.total_products, self.config.page_size);

        for (page, start) in starts.into_iter().enumerate() {
            result.pages_requested += 1;
            debug!(
                "Fetching page {} for category {}",
                page + 1,
                category.category_number
            );

            let page_result = match self.client.search_page_url(
                &category.category_number,
                start,
                self.config.page_size,
            ) {
                Ok(url) => self.client.search_page(&url).await,
                Err(e) => Err(e),
            };

            match page_result {
                Ok(ids) => identifiers.extend(ids),
                Err(e) => {
                    result.pages_failed += 1;
                    warn!(
                        "Error fetching page {} for category {}: {}",
                        page + 1,
                        category.category_number,
                        e
                    );
                }
            }

            self.pause().await;
        }

        identifiers
    }

    async fn fetch_detail(&self, sku: &str) -> Option<(ProductRecord, ImageRecord)> {
        match self.client.item_detail(sku).await {
            Ok(Some(detail)) => {
                let projected = transform::project(&detail);
                if projected.is_none() {
                    warn!("Unexpected detail record for SKU {}", sku);
                }
                projected
            }
            Ok(None) => {
                info!("No details found for SKU {}", sku);
                None
            }
            Err(e) => {
                warn!("Error fetching details for SKU {}: {}", sku, e);
                None
            }
        }
    }

    async fn pause(&self) {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
    }
}
