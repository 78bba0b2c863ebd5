//! Asset download operations with atomic writes and streaming
//!
//! [`AssetFetcher`] is the seam the download manager drives. The HTTP
//! implementation streams the body into a sibling temp file and renames it
//! onto the destination only after a clean finish, so a failed or interrupted
//! fetch never leaves a truncated file at the final path.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::config::ClientConfig;
use crate::app::client::http::HttpHandler;
use crate::constants::files;
use crate::errors::{ConfigResult, FetchError, FetchResult};

/// Materializes one URL at one path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download `url` into `destination`
    ///
    /// The parent directory of `destination` must already exist. On error no
    /// file is left at `destination`.
    async fn fetch(&self, url: &str, destination: &Path) -> FetchResult<()>;
}

/// Streaming HTTP implementation of [`AssetFetcher`]
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    http_handler: HttpHandler,
}

impl HttpAssetFetcher {
    /// Creates a fetcher on top of an existing HTTP handler
    pub fn new(http_handler: HttpHandler) -> Self {
        Self { http_handler }
    }

    /// Creates a fetcher with its own client built from `config`
    pub fn from_config(config: &ClientConfig) -> ConfigResult<Self> {
        let client = config.build_http_client()?;
        Ok(Self::new(HttpHandler::new(client)))
    }

    /// Sibling path the body is streamed into before the final rename
    pub fn temp_path_for(destination: &Path) -> PathBuf {
        let mut name = destination
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(files::TEMP_FILE_SUFFIX);
        destination.with_file_name(name)
    }

    /// Streams the response body into `temp_path`, returning bytes written
    async fn stream_to(&self, url: &Url, temp_path: &Path) -> FetchResult<u64> {
        let mut response = self.http_handler.get_response(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        let mut file = File::create(temp_path).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        Ok(written)
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchResult<()> {
        let parsed_url = Url::parse(url)
            .map_err(|e| FetchError::Transport(format!("invalid URL {}: {}", url, e)))?;

        let temp_path = Self::temp_path_for(destination);

        let result = match self.stream_to(&parsed_url, &temp_path).await {
            Ok(bytes) => tokio::fs::rename(&temp_path, destination)
                .await
                .map(|()| bytes)
                .map_err(|e| {
                    FetchError::Filesystem(format!(
                        "could not rename {} to {}: {}",
                        temp_path.display(),
                        destination.display(),
                        e
                    ))
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(bytes) => {
                tracing::debug!("Wrote {} bytes to {}", bytes, destination.display());
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            "Could not remove partial file {}: {}",
                            temp_path.display(),
                            cleanup
                        );
                    }
                }
                Err(e)
            }
        }
    }
}
