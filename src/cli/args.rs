//! Command-line argument parsing for Catalog Fetcher
//!
//! This module defines the CLI structure using clap derive macros: catalog
//! scraping, resumable download jobs, progress record inspection and
//! configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::constants::jobs;

/// Catalog Fetcher - scrape a product catalog and download its assets
#[derive(Parser, Debug)]
#[command(
    name = "catalog_fetcher",
    version,
    about = "Scrape a product catalog and download its assets resumably",
    long_about = "Scrapes product and image records from a remote catalog API and downloads
images, safety data sheets or arbitrary identifier lists. Downloads are paced, skip files
already on disk, and resume from a progress record after interruption."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape product and image datasets from the catalog
    Scrape(ScrapeArgs),

    /// Run (or resume) a download job
    Download(DownloadArgs),

    /// Show the pending items of a job
    Status(JobArgs),

    /// Delete a job's progress record
    Reset(JobArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Download flows, each with its own output directory and progress record
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Identifier -> URL JSON list
    List,
    /// Product images from the image dataset
    Images,
    /// Safety data sheets for products in the product dataset
    Documents,
    /// Main product images listed live from the catalog, named by SKU
    Catalog,
}

impl Job {
    /// Name used for directories and record paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Job::List => "list",
            Job::Images => "images",
            Job::Documents => "documents",
            Job::Catalog => "catalog",
        }
    }

    /// Extension appended to every file name of the job
    pub fn default_extension(&self) -> Option<&'static str> {
        match self {
            Job::List => Some(jobs::LIST_DEFAULT_EXTENSION),
            Job::Catalog => Some(jobs::CATALOG_IMAGE_EXTENSION),
            Job::Images | Job::Documents => None,
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for the scrape command
#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Categories file (`<categoryNumber>,<totalProducts>` per line)
    #[arg(short, long, value_name = "FILE")]
    pub categories: Option<PathBuf>,
}

/// Arguments for the download command
#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Which download flow to run
    #[arg(value_enum)]
    pub job: Job,

    /// Seed source (work list, image dataset, product dataset or categories file)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output directory for downloaded files
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Pause after each download attempt in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Maximum number of items in a fresh seed (for testing)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Dry run - show what would be downloaded without downloading
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments naming a job
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Download flow
    #[arg(value_enum)]
    pub job: Job,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }

    /// Log level directive, preferring verbosity flags over `configured`
    pub fn log_directive(&self, configured: &str) -> String {
        if self.global.quiet || self.global.very_verbose || self.global.verbose {
            self.log_level().to_string().to_lowercase()
        } else {
            configured.to_lowercase()
        }
    }
}

impl DownloadArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("Limit must be greater than 0".to_string());
        }

        if let Some(output) = &self.output {
            if output.as_os_str().is_empty() {
                return Err("Output directory cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
