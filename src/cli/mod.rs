//! Command-line interface components
//!
//! This module contains CLI-specific code for the Catalog Fetcher application,
//! including argument parsing, progress display, and command handlers.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs, GlobalArgs, Job, JobArgs, ScrapeArgs,
};
pub use commands::{handle_config, handle_download, handle_reset, handle_scrape, handle_status};
pub use progress::{DisplayTally, ProgressConfig, ProgressDisplay};
