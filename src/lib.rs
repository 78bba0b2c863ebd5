//! Catalog Fetcher Library
//!
//! A Rust library for scraping a remote product catalog and downloading its
//! assets. Downloads are paced, idempotent and resumable: a durable progress
//! record lets an interrupted run continue where it stopped.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        assert_eq!(PROGRESS_FILE_NAME, "download_progress.json");
        assert_eq!(TEMP_FILE_SUFFIX, ".tmp");
        assert_eq!(DEFAULT_INTER_ITEM_DELAY_MS, 500);
        assert!(USER_AGENT.contains("Mozilla"));
    }

    #[test]
    fn test_error_types() {
        let fetch_error = errors::FetchError::BadStatus(503);
        let app_error = AppError::from(fetch_error);

        assert_eq!(app_error.category(), "download");
        assert!(app_error.to_string().contains("503"));
    }
}
