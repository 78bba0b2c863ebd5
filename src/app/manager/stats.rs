//! Run statistics, final summary and progress events

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::app::models::{DownloadOutcome, WorkItem};
use crate::errors::FetchError;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing remains; the progress record was removed
    Complete,
    /// Some items failed and stay recorded for the next run
    Partial { remaining: usize },
    /// Stopped on request; unprocessed and failed items stay recorded
    Cancelled { remaining: usize },
}

/// An item that failed during this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub identifier: String,
    pub source_url: String,
    pub error: FetchError,
}

/// Final report of one download run
#[derive(Debug, Clone)]
pub struct DownloadSummary {
    /// Items in the seed set
    pub total: usize,
    /// Items fetched this run
    pub succeeded: usize,
    /// Items already on disk
    pub skipped: usize,
    /// Items whose fetch failed
    pub failed: usize,
    /// Items still pending in the progress record
    pub remaining: usize,
    /// Whether the seed came from a previous run's record
    pub resumed: bool,
    /// Failure details in processing order
    pub failures: Vec<FailedItem>,
    /// How the run ended
    pub status: RunStatus,
    /// When the run started
    pub session_start: DateTime<Utc>,
    /// Wall-clock duration
    pub duration: Duration,
}

impl DownloadSummary {
    /// Start an empty summary for a seed of `total` items
    pub(crate) fn start(total: usize, resumed: bool) -> Self {
        Self {
            total,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            remaining: total,
            resumed,
            failures: Vec::new(),
            status: RunStatus::Partial { remaining: total },
            session_start: Utc::now(),
            duration: Duration::ZERO,
        }
    }

    /// Count one item's outcome
    pub(crate) fn record(&mut self, item: &WorkItem, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Skipped(_) => self.skipped += 1,
            DownloadOutcome::Succeeded => self.succeeded += 1,
            DownloadOutcome::Failed(error) => {
                self.failed += 1;
                self.failures.push(FailedItem {
                    identifier: item.identifier.clone(),
                    source_url: item.source_url.clone(),
                    error: error.clone(),
                });
            }
        }
    }

    /// Items that reached an outcome this run
    pub fn processed(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// Whether the record was cleared
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// One-line human summary
    pub fn status_message(&self) -> String {
        match self.status {
            RunStatus::Complete => "All downloads completed successfully".to_string(),
            RunStatus::Partial { remaining } => format!(
                "Download process completed with {} remaining. Run again to retry failed downloads",
                remaining
            ),
            RunStatus::Cancelled { remaining } => {
                format!("Download interrupted with {} remaining", remaining)
            }
        }
    }
}

/// Progress notifications emitted while a run is in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    /// Processing is about to begin
    Started { total: usize, resumed: bool },
    /// Destination already existed
    ItemSkipped {
        index: usize,
        total: usize,
        identifier: String,
    },
    /// Asset written
    ItemSucceeded {
        index: usize,
        total: usize,
        identifier: String,
    },
    /// Fetch failed; item stays pending
    ItemFailed {
        index: usize,
        total: usize,
        identifier: String,
        error: FetchError,
    },
    /// Run finished
    Finished { status: RunStatus },
}

impl DownloadEvent {
    /// Event describing one item's outcome (`index` is 1-based)
    pub(crate) fn for_outcome(
        index: usize,
        total: usize,
        item: &WorkItem,
        outcome: &DownloadOutcome,
    ) -> Self {
        let identifier = item.identifier.clone();
        match outcome {
            DownloadOutcome::Skipped(_) => DownloadEvent::ItemSkipped {
                index,
                total,
                identifier,
            },
            DownloadOutcome::Succeeded => DownloadEvent::ItemSucceeded {
                index,
                total,
                identifier,
            },
            DownloadOutcome::Failed(error) => DownloadEvent::ItemFailed {
                index,
                total,
                identifier,
                error: error.clone(),
            },
        }
    }
}
