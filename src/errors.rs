//! Error types for Catalog Fetcher
//!
//! This module defines error types for all components of the application.
//! Item-level download failures ([`FetchError`]) are caught by the download
//! loop and never abort a run; the remaining types propagate to the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to materialize a single asset on disk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Remote origin answered with a non-success status
    #[error("Server responded with HTTP {0}")]
    BadStatus(u16),

    /// Connection, DNS, timeout or malformed URL
    #[error("Transport error: {0}")]
    Transport(String),

    /// Destination could not be written
    #[error("Filesystem error: {0}")]
    Filesystem(String),
}

impl FetchError {
    /// Every fetch failure stays pending and is attempted again next run
    pub fn is_retryable(&self) -> bool {
        true
    }

    /// Short failure class for logs and summaries
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::BadStatus(_) => "status",
            FetchError::Transport(_) => "transport",
            FetchError::Filesystem(_) => "filesystem",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => FetchError::BadStatus(status.as_u16()),
            None => FetchError::Transport(error.to_string()),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(error: std::io::Error) -> Self {
        FetchError::Filesystem(error.to_string())
    }
}

/// Progress record persistence errors
#[derive(Error, Debug)]
pub enum ProgressError {
    /// Record exists but could not be read
    #[error("Failed to read progress record {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record content is not an identifier -> URL object
    #[error("Progress record {path} is malformed")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Record could not be written
    #[error("Failed to write progress record {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be removed
    #[error("Failed to remove progress record {path}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Catalog listing and dataset errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Category list could not be read
    #[error("Category file not readable: {path}")]
    CategoriesUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Category list had no usable lines
    #[error("No categories found in {path}")]
    NoCategories { path: PathBuf },

    /// Request to the catalog API failed
    #[error("Catalog request failed: {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Catalog API answered with a non-success status
    #[error("Catalog request {url} returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    /// Catalog response body was not the expected JSON
    #[error("Unexpected catalog response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Every search page request failed, nothing could be listed
    #[error("Every search page request failed ({pages} pages)")]
    AllPagesFailed { pages: usize },

    /// Dataset or work list file could not be read or written
    #[error("Dataset I/O failed for {path}")]
    DatasetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset or work list file is not valid JSON of the expected shape
    #[error("Dataset {path} is malformed")]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read or written
    #[error("Configuration file I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration serialization failed")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// User config directory could not be determined
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// HTTP client could not be built from the settings
    #[error("HTTP client construction failed")]
    HttpClient(#[from] reqwest::Error),
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Single asset download error surfaced outside the download loop
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Progress record error
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "download",
            AppError::Progress(_) => "progress",
            AppError::Catalog(_) => "catalog",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Progress record result type alias
pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
