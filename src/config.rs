//! Configuration management for Catalog Fetcher
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{CatalogEndpoints, ClientConfig, ExtractorConfig, ManagerConfig};
use crate::constants::{catalog, env, files, http, jobs, limits};
use crate::errors::{ConfigError, ConfigResult};

/// Project-local config file name
const LOCAL_CONFIG_FILE: &str = "catalog-fetcher.toml";

/// Directory under the user config dir
const CONFIG_DIR_NAME: &str = "catalog-fetcher";

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Download engine settings
    pub download: DownloadConfigToml,
    /// Catalog API settings
    pub catalog: CatalogConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Headers sent with every request
    pub request_headers: BTreeMap<String, String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        let runtime = ClientConfig::default();
        Self {
            request_headers: runtime.request_headers,
            request_timeout_ms: http::DEFAULT_TIMEOUT.as_millis() as u64,
            connect_timeout_ms: http::CONNECT_TIMEOUT.as_millis() as u64,
        }
    }
}

/// TOML-friendly download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfigToml {
    /// Pause after each fetch attempt in milliseconds
    pub inter_item_delay_ms: u64,
    /// Root under which each job gets its own output directory
    pub output_root: PathBuf,
    /// Directory for datasets, work lists and progress records
    pub data_dir: PathBuf,
    /// Progress record file name inside each job's data directory
    pub progress_file_name: String,
}

impl Default for DownloadConfigToml {
    fn default() -> Self {
        Self {
            inter_item_delay_ms: limits::DEFAULT_INTER_ITEM_DELAY_MS,
            output_root: PathBuf::from(jobs::DEFAULT_OUTPUT_ROOT),
            data_dir: PathBuf::from(jobs::DEFAULT_DATA_DIR),
            progress_file_name: files::PROGRESS_FILE_NAME.to_string(),
        }
    }
}

/// TOML-friendly catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfigToml {
    /// Search API base URL
    pub base_url: String,
    /// Base URL for safety data sheet files
    pub pdf_base_url: String,
    /// Categories file read by `scrape`
    pub categories_file: PathBuf,
    /// Products per search page
    pub page_size: u32,
    /// Pause between catalog requests in milliseconds
    pub detail_delay_ms: u64,
}

impl Default for CatalogConfigToml {
    fn default() -> Self {
        Self {
            base_url: catalog::BASE_URL.to_string(),
            pdf_base_url: catalog::PDF_BASE_URL.to_string(),
            categories_file: PathBuf::from(files::CATEGORIES_FILE),
            page_size: catalog::PRODUCTS_PER_PAGE,
            detail_delay_ms: limits::DEFAULT_DETAIL_DELAY_MS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicitly given file is missing,
    /// or a read/parse error for a config file that exists
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path });
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = std::env::var(env::API_KEY) {
            if !api_key.trim().is_empty() {
                debug!("Using API key from {}", env::API_KEY);
                self.client
                    .request_headers
                    .insert(http::API_KEY_HEADER.to_string(), api_key.trim().to_string());
            }
        }
    }

    /// Check values that would make every run fail
    pub fn validate(&self) -> ConfigResult<()> {
        if self.catalog.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "catalog.page_size".to_string(),
                value: "0".to_string(),
                reason: "Page size must be at least 1".to_string(),
            });
        }

        if self.download.progress_file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "download.progress_file_name".to_string(),
                value: String::new(),
                reason: "Progress file name cannot be empty".to_string(),
            });
        }

        if self.client.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "Request timeout must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Runtime HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            request_headers: self.client.request_headers.clone(),
            request_timeout: Duration::from_millis(self.client.request_timeout_ms),
            connect_timeout: Duration::from_millis(self.client.connect_timeout_ms),
            ..ClientConfig::default()
        }
    }

    /// Catalog endpoint locations
    pub fn endpoints(&self) -> CatalogEndpoints {
        CatalogEndpoints {
            base_url: self.catalog.base_url.clone(),
            pdf_base_url: self.catalog.pdf_base_url.clone(),
        }
    }

    /// Extractor settings
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            categories_file: self.catalog.categories_file.clone(),
            data_dir: self.download.data_dir.clone(),
            page_size: self.catalog.page_size,
            request_delay: Duration::from_millis(self.catalog.detail_delay_ms),
        }
    }

    /// Download manager settings for `job`
    pub fn manager_config(&self, job: &str) -> ManagerConfig {
        ManagerConfig::new(self.job_output_dir(job))
            .with_inter_item_delay(Duration::from_millis(self.download.inter_item_delay_ms))
    }

    /// Output directory of `job`
    pub fn job_output_dir(&self, job: &str) -> PathBuf {
        self.download.output_root.join(job)
    }

    /// Progress record path of `job`
    pub fn job_progress_path(&self, job: &str) -> PathBuf {
        self.download
            .data_dir
            .join(job)
            .join(&self.download.progress_file_name)
    }

    /// Path of the product dataset
    pub fn product_data_path(&self) -> PathBuf {
        self.download.data_dir.join(files::PRODUCT_DATA_FILE)
    }

    /// Path of the image dataset
    pub fn image_data_path(&self) -> PathBuf {
        self.download.data_dir.join(files::IMAGE_DATA_FILE)
    }

    /// Default identifier -> URL list for the `list` job
    pub fn work_list_path(&self) -> PathBuf {
        self.download.data_dir.join(files::WORK_LIST_FILE)
    }

    /// Initialize configuration on first run
    ///
    /// Writes the default config file when no config file exists in any
    /// standard location and tells the user where it went. Returns the path
    /// written, if any.
    pub async fn initialize_first_run() -> ConfigResult<Option<PathBuf>> {
        if Self::find_config_file().is_some() {
            return Ok(None);
        }

        let config_path = Self::get_default_config_path()?;
        info!("Creating default configuration file...");
        Self::write_default_config(&config_path).await?;

        println!("📁 Created default configuration file:");
        println!("   {}", config_path.display());
        println!("   You can customize settings by editing this file.");
        println!();

        Ok(Some(config_path))
    }

    /// Write the commented default configuration to `path`
    pub async fn write_default_config(path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(io_error)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(LOCAL_CONFIG_FILE)];
        if let Ok(user_config) = Self::get_default_config_path() {
            search_paths.push(user_config);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        let headers: String = ClientConfigToml::default()
            .request_headers
            .iter()
            .map(|(name, value)| format!("{:?} = {:?}\n", name, value))
            .collect();

        format!(
            r#"# Catalog Fetcher Configuration
# This file was automatically generated on first run.
# You can customize any of these settings to suit your needs.
# The catalog API key is read from the {api_key_env} environment variable
# (or a .env file); it can also be set as "{api_key_header}" under
# [client.request_headers].

[client]
# Request timeout in milliseconds (body included)
request_timeout_ms = {request_timeout_ms}
connect_timeout_ms = {connect_timeout_ms}

[download]
# Pause after each download attempt, in milliseconds
inter_item_delay_ms = {delay}
# Each job writes to <output_root>/<job>
output_root = "{output_root}"
# Datasets, work lists and per-job progress records
data_dir = "{data_dir}"
progress_file_name = "{progress_file}"

[catalog]
base_url = "{base_url}"
pdf_base_url = "{pdf_base_url}"
# One "<categoryNumber>,<totalProducts>" line per category
categories_file = "{categories_file}"
page_size = {page_size}
# Pause between catalog requests, in milliseconds
detail_delay_ms = {detail_delay}

[logging]
level = "warn"  # error, warn, info, debug, trace

[client.request_headers]
{headers}"#,
            api_key_env = env::API_KEY,
            api_key_header = http::API_KEY_HEADER,
            request_timeout_ms = http::DEFAULT_TIMEOUT.as_millis(),
            connect_timeout_ms = http::CONNECT_TIMEOUT.as_millis(),
            delay = limits::DEFAULT_INTER_ITEM_DELAY_MS,
            output_root = jobs::DEFAULT_OUTPUT_ROOT,
            data_dir = jobs::DEFAULT_DATA_DIR,
            progress_file = files::PROGRESS_FILE_NAME,
            base_url = catalog::BASE_URL,
            pdf_base_url = catalog::PDF_BASE_URL,
            categories_file = files::CATEGORIES_FILE,
            page_size = catalog::PRODUCTS_PER_PAGE,
            detail_delay = limits::DEFAULT_DETAIL_DELAY_MS,
            headers = headers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_default_config_creation() {
        let config = AppConfig::default();

        assert_eq!(
            config.download.inter_item_delay_ms,
            limits::DEFAULT_INTER_ITEM_DELAY_MS
        );
        assert_eq!(config.catalog.page_size, catalog::PRODUCTS_PER_PAGE);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_file_generation() {
        let content = AppConfig::generate_default_config_content();

        // Should be valid TOML
        let parsed: AppConfig = toml::from_str(&content).unwrap();

        assert_eq!(parsed.catalog.page_size, catalog::PRODUCTS_PER_PAGE);
        assert_eq!(
            parsed.client.request_headers,
            ClientConfigToml::default().request_headers
        );
        assert!(content.contains("# Catalog Fetcher Configuration"));
        assert!(content.contains("[download]"));
        assert!(content.contains("[client]"));
    }

    #[tokio::test]
    async fn test_config_loading_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        // Should fail when explicitly specified
        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let test_config = r#"
[download]
inter_item_delay_ms = 1000
output_root = "/srv/assets"

[logging]
level = "debug"
"#;
        tokio::fs::write(&config_path, test_config).await.unwrap();

        let config = AppConfig::load(Some(config_path)).await.unwrap();

        assert_eq!(config.download.inter_item_delay_ms, 1000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.catalog.page_size, catalog::PRODUCTS_PER_PAGE);
        assert_eq!(
            config.job_output_dir("images"),
            PathBuf::from("/srv/assets/images")
        );
        assert_eq!(
            config.manager_config("images").inter_item_delay,
            Duration::from_millis(1000)
        );
    }

    #[tokio::test]
    async fn test_invalid_value_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        tokio::fs::write(&config_path, "[catalog]\npage_size = 0\n")
            .await
            .unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_malformed_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        tokio::fs::write(&config_path, "[download\n").await.unwrap();

        let result = AppConfig::load(Some(config_path)).await;
        assert!(matches!(result, Err(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_job_paths() {
        let config = AppConfig::default();
        assert_eq!(
            config.job_progress_path("documents"),
            PathBuf::from("data/documents/download_progress.json")
        );
        assert_eq!(config.job_output_dir("list"), PathBuf::from("downloads/list"));
    }

    #[test]
    fn test_client_config_conversion() {
        let mut config = AppConfig::default();
        config.client.request_timeout_ms = 2500;
        config
            .client
            .request_headers
            .insert(http::API_KEY_HEADER.to_string(), "secret".to_string());

        let runtime = config.client_config();
        assert_eq!(runtime.request_timeout, Duration::from_millis(2500));
        assert_eq!(
            runtime.request_headers.get(http::API_KEY_HEADER).map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.catalog.base_url, config.catalog.base_url);
    }
}
