//! Category list parsing and search pagination

use std::path::Path;

use tracing::debug;

use crate::app::models::CategorySpec;
use crate::errors::{CatalogError, CatalogResult};

/// Read and parse a categories file
///
/// # Errors
///
/// Returns `CatalogError::CategoriesUnreadable` if the file cannot be read and
/// `CatalogError::NoCategories` if it holds no usable line
pub fn read_categories(path: &Path) -> CatalogResult<Vec<CategorySpec>> {
    let content =
        std::fs::read_to_string(path).map_err(|source| CatalogError::CategoriesUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let categories = parse_categories(&content);
    if categories.is_empty() {
        return Err(CatalogError::NoCategories {
            path: path.to_path_buf(),
        });
    }

    debug!("Read {} categories from {}", categories.len(), path.display());
    Ok(categories)
}

/// Parse `<categoryNumber>,<totalProducts>` lines
///
/// Blank lines and lines without a numeric total are skipped.
pub fn parse_categories(content: &str) -> Vec<CategorySpec> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let category_number = fields.next().filter(|s| !s.is_empty())?;
            let total_products = match fields.next()?.parse::<u32>() {
                Ok(total) => total,
                Err(_) => {
                    debug!("Skipping malformed category line: {}", line.trim());
                    return None;
                }
            };

            Some(CategorySpec {
                category_number: category_number.to_string(),
                total_products,
            })
        })
        .collect()
}

/// 1-based start index of every search page for a category
pub fn page_starts(total_products: u32, page_size: u32) -> Vec<u32> {
    if page_size == 0 {
        return Vec::new();
    }

    let pages = total_products.div_ceil(page_size);
    (0..pages).map(|page| page * page_size + 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_categories() {
        let content = "12345, 50\n\n  678,24\nbroken\n999,abc\n,10\n";
        let categories = parse_categories(content);

        assert_eq!(
            categories,
            vec![
                CategorySpec {
                    category_number: "12345".into(),
                    total_products: 50
                },
                CategorySpec {
                    category_number: "678".into(),
                    total_products: 24
                },
            ]
        );
    }

    #[test]
    fn test_page_starts() {
        assert_eq!(page_starts(50, 24), vec![1, 25, 49]);
        assert_eq!(page_starts(24, 24), vec![1]);
        assert_eq!(page_starts(0, 24), Vec::<u32>::new());
        assert_eq!(page_starts(10, 0), Vec::<u32>::new());
    }

    #[test]
    fn test_read_categories_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = read_categories(&dir.path().join("categories.txt"));
        assert!(matches!(
            result,
            Err(CatalogError::CategoriesUnreadable { .. })
        ));
    }

    #[test]
    fn test_read_categories_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.txt");
        std::fs::write(&path, "\n\n").unwrap();

        assert!(matches!(
            read_categories(&path),
            Err(CatalogError::NoCategories { .. })
        ));
    }
}
