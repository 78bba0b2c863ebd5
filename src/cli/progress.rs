//! Progress display for download runs
//!
//! The display consumes [`DownloadEvent`]s from the download manager. On a
//! terminal it drives an indicatif progress bar; elsewhere (pipes, CI logs)
//! it prints one line per item.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::{DownloadEvent, RunStatus};
use crate::constants::progress::SPINNER_TICK_MS;

/// Configuration for progress display
#[derive(Debug, Clone)]
pub struct ProgressConfig {
    /// Enable visual progress bars
    pub enable_progress_bars: bool,
    /// Print nothing per item
    pub quiet: bool,
    /// Maximum width for identifiers in the bar message
    pub max_identifier_width: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enable_progress_bars: true,
            quiet: false,
            max_identifier_width: 40,
        }
    }
}

/// Counts observed by the display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayTally {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub finished: bool,
}

/// Renders download events to the terminal
pub struct ProgressDisplay {
    config: ProgressConfig,
    is_terminal: bool,
}

impl ProgressDisplay {
    /// Create a new progress display with the given configuration
    pub fn new(config: ProgressConfig) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        Self {
            config,
            is_terminal,
        }
    }

    /// Whether the bar (rather than text lines) will be used
    pub fn uses_bar(&self) -> bool {
        self.config.enable_progress_bars && self.is_terminal && !self.config.quiet
    }

    /// Consume events until the channel closes or the run finishes
    pub fn spawn(self, mut events: mpsc::Receiver<DownloadEvent>) -> JoinHandle<DisplayTally> {
        tokio::spawn(async move {
            let mut tally = DisplayTally::default();
            let mut bar: Option<ProgressBar> = None;

            while let Some(event) = events.recv().await {
                match &event {
                    DownloadEvent::Started { total, resumed } => {
                        if self.uses_bar() {
                            bar = self.create_bar(*total as u64);
                        }
                        if *resumed {
                            self.print_line(&bar, format!("↻ Resuming with {} pending items", total));
                        }
                    }
                    DownloadEvent::ItemSkipped {
                        index,
                        total,
                        identifier,
                    } => {
                        tally.skipped += 1;
                        if bar.is_none() {
                            self.print_line(
                                &bar,
                                format!("[{}/{}] ⏭ {} already exists", index, total, identifier),
                            );
                        }
                    }
                    DownloadEvent::ItemSucceeded {
                        index,
                        total,
                        identifier,
                    } => {
                        tally.succeeded += 1;
                        if bar.is_none() {
                            self.print_line(
                                &bar,
                                format!("[{}/{}] ✓ Downloaded {}", index, total, identifier),
                            );
                        }
                    }
                    DownloadEvent::ItemFailed {
                        index,
                        total,
                        identifier,
                        error,
                    } => {
                        tally.failed += 1;
                        self.print_line(
                            &bar,
                            format!("[{}/{}] ✗ {} failed: {}", index, total, identifier, error),
                        );
                    }
                    DownloadEvent::Finished { status } => {
                        tally.finished = true;
                        if let Some(pb) = bar.take() {
                            pb.finish_and_clear();
                        }
                        debug!("Download run finished: {:?}", status);
                        if matches!(status, RunStatus::Cancelled { .. }) && !self.config.quiet {
                            println!("🛑 Stopped on request; progress has been saved");
                        }
                        break;
                    }
                }

                if let (Some(pb), Some(identifier)) = (&bar, event_identifier(&event)) {
                    pb.inc(1);
                    pb.set_message(truncate_identifier(
                        identifier,
                        self.config.max_identifier_width,
                    ));
                }
            }

            if let Some(pb) = bar {
                pb.abandon();
            }
            tally
        })
    }

    fn create_bar(&self, total: u64) -> Option<ProgressBar> {
        let style = match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            Ok(style) => style.progress_chars("##-"),
            Err(e) => {
                debug!("Progress bar template error: {}", e);
                return None;
            }
        };

        let pb = ProgressBar::new(total);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        Some(pb)
    }

    fn print_line(&self, bar: &Option<ProgressBar>, line: String) {
        if self.config.quiet {
            return;
        }
        match bar {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}

fn event_identifier(event: &DownloadEvent) -> Option<&str> {
    match event {
        DownloadEvent::ItemSkipped { identifier, .. }
        | DownloadEvent::ItemSucceeded { identifier, .. }
        | DownloadEvent::ItemFailed { identifier, .. } => Some(identifier),
        DownloadEvent::Started { .. } | DownloadEvent::Finished { .. } => None,
    }
}

/// Shorten an identifier to `max_width` characters, keeping its end
pub fn truncate_identifier(identifier: &str, max_width: usize) -> String {
    let count = identifier.chars().count();
    if count <= max_width || max_width < 4 {
        return identifier.to_string();
    }

    let keep = max_width - 3;
    let tail: String = identifier.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
