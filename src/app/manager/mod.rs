//! Resumable bulk download engine
//!
//! The manager walks a [`WorkSet`] in order, fetching each asset whose
//! destination does not already exist, and rewrites the progress record after
//! every item. An interrupted run therefore resumes from the record, and a
//! finished run leaves no record behind.
//!
//! # Architecture
//!
//! - [`config`] - Output location, file naming and pacing
//! - [`paths`] - Identifier to destination path mapping
//! - [`stats`] - Run summary and progress events
//! - [`signals`] - Ctrl-C / SIGTERM to cooperative shutdown
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_fetcher::app::{
//!     ClientConfig, DownloadManager, HttpAssetFetcher, ManagerConfig, ProgressStore, WorkSet,
//! };
//!
//! # async fn example() -> catalog_fetcher::Result<()> {
//! let fetcher = HttpAssetFetcher::from_config(&ClientConfig::default())?;
//! let store = ProgressStore::new("data/download_progress.json");
//! let config = ManagerConfig::new("downloads/sds").with_default_extension("pdf");
//!
//! let mut manager = DownloadManager::new(config, store, fetcher);
//! let summary = manager
//!     .run(|| async {
//!         let mut set = WorkSet::new();
//!         set.insert("123456", "https://example.com/123456.pdf");
//!         Ok(set)
//!     })
//!     .await?;
//! println!("{}", summary.status_message());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod paths;
pub mod signals;
pub mod stats;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::path::Path;
use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::app::client::AssetFetcher;
use crate::app::models::{DownloadOutcome, SkipReason, WorkItem, WorkSet};
use crate::app::progress::ProgressStore;
use crate::errors::{AppError, FetchError, Result};

pub use config::ManagerConfig;
pub use paths::PathGenerator;
pub use signals::{create_shutdown_channel, ShutdownListener, SignalHandler};
pub use stats::{DownloadEvent, DownloadSummary, FailedItem, RunStatus};

/// Sequential, resumable download engine
pub struct DownloadManager<F: AssetFetcher> {
    config: ManagerConfig,
    store: ProgressStore,
    fetcher: F,
    events: Option<mpsc::Sender<DownloadEvent>>,
    shutdown: ShutdownListener,
}

impl<F: AssetFetcher> DownloadManager<F> {
    /// Create a manager writing into `config.output_dir` and recording progress in `store`
    pub fn new(config: ManagerConfig, store: ProgressStore, fetcher: F) -> Self {
        Self {
            config,
            store,
            fetcher,
            events: None,
            shutdown: ShutdownListener::disabled(),
        }
    }

    /// Send progress events to `sender`
    pub fn with_events(mut self, sender: mpsc::Sender<DownloadEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Stop between items when `shutdown_rx` fires
    pub fn with_shutdown(mut self, shutdown_rx: broadcast::Receiver<()>) -> Self {
        self.shutdown = ShutdownListener::new(shutdown_rx);
        self
    }

    /// Manager configuration
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Progress record backing this manager
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Run to completion, cancellation, or a fatal error
    ///
    /// A progress record left by a previous run takes priority; `fresh_seed`
    /// is only invoked when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed cannot be produced, the output directory
    /// cannot be created, or the progress record cannot be written. Individual
    /// fetch failures are not errors; they are reported in the summary.
    pub async fn run<S, Fut>(&mut self, fresh_seed: S) -> Result<DownloadSummary>
    where
        S: FnOnce() -> Fut,
        Fut: Future<Output = Result<WorkSet>>,
    {
        self.config.validate().map_err(AppError::generic)?;

        let (seed, resumed) = match self.store.load()? {
            Some(record) => {
                info!(
                    "Resuming from {} with {} pending items",
                    self.store.path().display(),
                    record.len()
                );
                (record, true)
            }
            None => (fresh_seed().await?, false),
        };

        self.process(seed, resumed).await
    }

    /// Run with an explicit fresh seed
    pub async fn run_with_seed(&mut self, seed: WorkSet) -> Result<DownloadSummary> {
        self.run(|| async move { Ok(seed) }).await
    }

    async fn process(&mut self, seed: WorkSet, resumed: bool) -> Result<DownloadSummary> {
        let started = Instant::now();
        let total = seed.len();
        let mut summary = DownloadSummary::start(total, resumed);

        if seed.is_empty() {
            info!("Nothing to download");
            self.store.clear()?;
            summary.status = RunStatus::Complete;
            summary.remaining = 0;
            summary.duration = started.elapsed();
            self.emit(DownloadEvent::Finished {
                status: summary.status,
            })
            .await;
            return Ok(summary);
        }

        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        // The record exists from the first moment so an early crash still resumes
        let mut pending = seed.clone();
        self.store.save(&pending)?;

        info!(
            "Processing {} items into {}",
            total,
            self.config.output_dir.display()
        );
        self.emit(DownloadEvent::Started { total, resumed }).await;

        let mut cancelled = false;
        for (index, item) in seed.iter().enumerate() {
            if self.shutdown.is_triggered() {
                cancelled = true;
                break;
            }

            let position = index + 1;
            let destination = PathGenerator::destination_for(
                &self.config.output_dir,
                &item.identifier,
                self.config.default_extension.as_deref(),
            );

            let outcome = self.process_item(item, &destination).await;
            self.log_outcome(position, total, item, &outcome);

            if outcome.is_complete() {
                pending.remove(&item.identifier);
            }
            self.store.save(&pending)?;

            summary.record(item, &outcome);
            self.emit(DownloadEvent::for_outcome(position, total, item, &outcome))
                .await;

            let fetched = !matches!(outcome, DownloadOutcome::Skipped(_));
            if fetched && position < total && self.shutdown.sleep(self.config.inter_item_delay).await {
                cancelled = true;
                break;
            }
        }

        summary.remaining = pending.len();
        summary.status = if pending.is_empty() {
            self.store.clear()?;
            RunStatus::Complete
        } else if cancelled {
            RunStatus::Cancelled {
                remaining: pending.len(),
            }
        } else {
            RunStatus::Partial {
                remaining: pending.len(),
            }
        };
        summary.duration = started.elapsed();

        info!("{}", summary.status_message());
        self.emit(DownloadEvent::Finished {
            status: summary.status,
        })
        .await;

        Ok(summary)
    }

    async fn process_item(&self, item: &WorkItem, destination: &Path) -> DownloadOutcome {
        match tokio::fs::try_exists(destination).await {
            Ok(true) => return DownloadOutcome::Skipped(SkipReason::AlreadyExists),
            Ok(false) => {}
            Err(e) => return DownloadOutcome::Failed(FetchError::from(e)),
        }

        match self.fetcher.fetch(&item.source_url, destination).await {
            Ok(()) => DownloadOutcome::Succeeded,
            Err(e) => DownloadOutcome::Failed(e),
        }
    }

    fn log_outcome(&self, position: usize, total: usize, item: &WorkItem, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Skipped(_) => {
                debug!("[{}/{}] {} already exists", position, total, item.identifier)
            }
            DownloadOutcome::Succeeded => {
                info!("[{}/{}] Downloaded {}", position, total, item.identifier)
            }
            DownloadOutcome::Failed(e) => warn!(
                "[{}/{}] Failed to download {} from {}: {}",
                position, total, item.identifier, item.source_url, e
            ),
        }
    }

    async fn emit(&self, event: DownloadEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only loses display updates
            let _ = sender.send(event).await;
        }
    }
}
