//! Application constants for Catalog Fetcher
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Overrides the `x-api-key` request header when set
    pub const API_KEY: &str = "CATALOG_API_KEY";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Browser user agent the catalog API expects
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum number of redirects to follow
    pub const MAX_REDIRECTS: usize = 10;

    /// Header carrying the catalog API key
    pub const API_KEY_HEADER: &str = "x-api-key";

    /// Default headers sent with every catalog request
    pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
        ("accept", "application/json, text/plain, */*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("origin", "https://www.biggestbook.com"),
        ("referer", "https://www.biggestbook.com/"),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "cross-site"),
    ];
}

/// Pacing between requests
pub mod limits {
    /// Default delay between downloaded items (milliseconds)
    pub const DEFAULT_INTER_ITEM_DELAY_MS: u64 = 500;

    /// Default delay between catalog detail requests (milliseconds)
    pub const DEFAULT_DETAIL_DELAY_MS: u64 = 500;
}

/// Remote catalog endpoints
pub mod catalog {
    /// Search API base URL
    pub const BASE_URL: &str = "https://api.essendant.com/digital/digitalservices/search/v2";

    /// Base URL for safety data sheet PDFs
    pub const PDF_BASE_URL: &str = "https://content.oppictures.com/Master_Images/Master_PDF_Files";

    /// Products returned per search page
    pub const PRODUCTS_PER_PAGE: u32 = 24;

    /// Maximum MSDS documents requested per SKU
    pub const MSDS_ROWS: u32 = 30;

    /// Placeholder written for fields the catalog does not provide
    pub const NOT_AVAILABLE: &str = "N/A";
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Progress record file name inside a job's state directory
    pub const PROGRESS_FILE_NAME: &str = "download_progress.json";

    /// Product dataset file name
    pub const PRODUCT_DATA_FILE: &str = "product_data.json";

    /// Image dataset file name
    pub const IMAGE_DATA_FILE: &str = "image_data.json";

    /// Category list consumed by the scraper
    pub const CATEGORIES_FILE: &str = "categories.txt";

    /// Default identifier -> URL input for the `list` job
    pub const WORK_LIST_FILE: &str = "work_list.json";

    /// Characters replaced when turning identifiers into file names
    pub const UNSAFE_FILENAME_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

    /// Replacement for unsafe file name characters
    pub const FILENAME_REPLACEMENT: char = '-';

    /// Hex digits of the identifier digest added to sanitized file names
    pub const NAME_DIGEST_LEN: usize = 8;
}

/// Download job defaults
pub mod jobs {
    /// Default root for downloaded assets
    pub const DEFAULT_OUTPUT_ROOT: &str = "downloads";

    /// Default directory holding datasets and progress records
    pub const DEFAULT_DATA_DIR: &str = "data";

    /// Extension appended to file names in the `list` job
    pub const LIST_DEFAULT_EXTENSION: &str = "pdf";

    /// Extension appended to SKU-named main images in the `catalog` job
    pub const CATALOG_IMAGE_EXTENSION: &str = "jpg";
}

/// Progress reporting
pub mod progress {
    /// Channel capacity for download events
    pub const EVENT_CHANNEL_CAPACITY: usize = 256;

    /// Spinner tick interval (milliseconds)
    pub const SPINNER_TICK_MS: u64 = 120;
}

pub use files::{PROGRESS_FILE_NAME, TEMP_FILE_SUFFIX};
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::DEFAULT_INTER_ITEM_DELAY_MS;
