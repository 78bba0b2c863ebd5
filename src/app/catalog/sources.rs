//! Work-set sources and dataset files
//!
//! A download run is seeded from one of three places: a plain identifier to
//! URL JSON file, the image dataset, or safety data sheets looked up for every
//! product in the product dataset.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::client::CatalogClient;
use crate::app::models::{ImageDataset, ProductDataset, WorkSet};
use crate::constants::catalog::NOT_AVAILABLE;
use crate::errors::{CatalogError, CatalogResult};

/// Read an identifier -> URL JSON object
pub fn work_set_from_file(path: &Path) -> CatalogResult<WorkSet> {
    let work_set: WorkSet = read_json(path)?;
    debug!("Loaded {} work items from {}", work_set.len(), path.display());
    Ok(work_set)
}

/// Read `product_data.json`
pub fn load_product_dataset(path: &Path) -> CatalogResult<ProductDataset> {
    read_json(path)
}

/// Read `image_data.json`
pub fn load_image_dataset(path: &Path) -> CatalogResult<ImageDataset> {
    read_json(path)
}

/// Write a dataset as pretty-printed JSON, creating the parent directory
pub fn write_dataset<T: Serialize>(path: &Path, dataset: &T) -> CatalogResult<()> {
    let io_error = |source: std::io::Error| CatalogError::DatasetIo {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let json = serde_json::to_string_pretty(dataset).map_err(|source| {
        CatalogError::DatasetParse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    std::fs::write(path, json).map_err(io_error)
}

/// One item per image: `<sku>_main_<file>` and `<sku>_additional_<n>_<file>`
///
/// Placeholder "N/A" URLs are skipped.
pub fn work_set_from_images(dataset: &ImageDataset) -> WorkSet {
    let mut work_set = WorkSet::new();

    for record in &dataset.images {
        if is_available(&record.image.url) {
            let identifier = format!("{}_main_{}", record.sku, url_basename(&record.image.url));
            work_set.insert_if_absent(identifier, record.image.url.clone());
        }

        for (index, extra) in record.more_images.iter().enumerate() {
            if !is_available(&extra.url) {
                continue;
            }
            let identifier = format!(
                "{}_additional_{}_{}",
                record.sku,
                index + 1,
                url_basename(&extra.url)
            );
            work_set.insert_if_absent(identifier, extra.url.clone());
        }
    }

    debug!(
        "Derived {} image items from {} records",
        work_set.len(),
        dataset.images.len()
    );
    work_set
}

/// Look up safety data sheets for every product
///
/// The document file name is the identifier; the first URL seen for a name
/// wins. Failed lookups are logged and contribute nothing. `delay` paces the
/// lookups.
pub async fn work_set_from_documents(
    dataset: &ProductDataset,
    client: &CatalogClient,
    delay: Duration,
) -> WorkSet {
    let mut work_set = WorkSet::new();
    let skus: Vec<&str> = dataset
        .products
        .iter()
        .map(|product| product.sku.as_str())
        .filter(|sku| is_available(sku))
        .collect();

    for (index, sku) in skus.iter().enumerate() {
        match client.sds_documents(sku).await {
            Ok(names) if names.is_empty() => debug!("No SDS documents found for SKU {}", sku),
            Ok(names) => {
                for name in names {
                    let url = client.sds_pdf_url(&name);
                    work_set.insert_if_absent(name, url);
                }
            }
            Err(e) => warn!("Error fetching SDS documents for SKU {}: {}", sku, e),
        }

        if index + 1 < skus.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!(
        "Found {} SDS documents across {} products",
        work_set.len(),
        skus.len()
    );
    work_set
}

/// Last path segment of a URL, without query or fragment
pub fn url_basename(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("image")
        .to_string()
}

fn is_available(value: &str) -> bool {
    !value.is_empty() && value != NOT_AVAILABLE
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CatalogResult<T> {
    let content = std::fs::read(path).map_err(|source| CatalogError::DatasetIo {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&content).map_err(|source| CatalogError::DatasetParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::{ImageRecord, ImageRef};
    use tempfile::TempDir;

    fn image_record(sku: &str, main: &str, more: &[&str]) -> ImageRecord {
        ImageRecord {
            sku: sku.into(),
            product_name: "Widget".into(),
            image: ImageRef { url: main.into() },
            more_images: more.iter().map(|url| ImageRef { url: (*url).into() }).collect(),
            category_number: "1".into(),
        }
    }

    #[test]
    fn test_work_set_from_images() {
        let dataset = ImageDataset::new(vec![
            image_record(
                "S1",
                "https://cdn/x/main.jpg?w=500",
                &["https://cdn/x/a.jpg", "N/A", "https://cdn/x/c.jpg"],
            ),
            image_record("S2", "N/A", &[]),
        ]);

        let work_set = work_set_from_images(&dataset);
        assert_eq!(
            work_set.identifiers().collect::<Vec<_>>(),
            vec!["S1_main_main.jpg", "S1_additional_1_a.jpg", "S1_additional_3_c.jpg"]
        );
        assert_eq!(
            work_set.get("S1_main_main.jpg"),
            Some("https://cdn/x/main.jpg?w=500")
        );
    }

    #[test]
    fn test_url_basename() {
        assert_eq!(url_basename("https://a/b/c.png"), "c.png");
        assert_eq!(url_basename("https://a/b/c.png?x=1#f"), "c.png");
        assert_eq!(url_basename("https://a/b/"), "b");
        assert_eq!(url_basename("not a url/d.gif?q"), "d.gif");
    }

    #[test]
    fn test_work_set_from_file_keeps_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(&path, r#"{"Z": "http://h/z", "A": "http://h/a"}"#).unwrap();

        let work_set = work_set_from_file(&path).unwrap();
        assert_eq!(work_set.identifiers().collect::<Vec<_>>(), vec!["Z", "A"]);
    }

    #[test]
    fn test_work_set_from_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = work_set_from_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::DatasetIo { .. })));
    }

    #[test]
    fn test_dataset_write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("image_data.json");
        let dataset = ImageDataset::new(vec![image_record("S1", "https://cdn/m.jpg", &[])]);

        write_dataset(&path, &dataset).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"totalItems\": 1"));
        assert_eq!(load_image_dataset(&path).unwrap(), dataset);
    }
}
