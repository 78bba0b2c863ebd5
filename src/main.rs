//! Catalog Fetcher CLI application
//!
//! Command-line interface for scraping a product catalog and downloading its
//! images and safety data sheets with resumable progress tracking.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use catalog_fetcher::cli::{
    handle_config, handle_download, handle_reset, handle_scrape, handle_status, Cli, Commands,
};
use catalog_fetcher::config::AppConfig;
use catalog_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.global.config.is_none() && !matches!(cli.command, Commands::Config(_)) {
        if let Err(e) = AppConfig::initialize_first_run().await {
            eprintln!("Warning: could not write default configuration: {}", e);
        }
    }

    // Config init must work even when the current file is broken
    let config = match &cli.command {
        Commands::Config(_) => AppConfig::load(cli.global.config.clone())
            .await
            .unwrap_or_default(),
        _ => AppConfig::load(cli.global.config.clone()).await?,
    };

    init_logging(&cli, &config);

    info!("Catalog Fetcher v{} starting", env!("CARGO_PKG_VERSION"));

    let quiet = cli.global.quiet;
    match cli.command {
        Commands::Scrape(args) => {
            info!("Executing scrape command");
            handle_scrape(args, &config, quiet).await
        }
        Commands::Download(args) => {
            info!("Executing download command");
            handle_download(args, &config, quiet).await
        }
        Commands::Status(args) => {
            info!("Executing status command");
            handle_status(args, &config).await
        }
        Commands::Reset(args) => {
            info!("Executing reset command");
            handle_reset(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config, cli.global.config.clone()).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli, config: &AppConfig) {
    let level = cli.log_directive(&config.logging.level);

    let mut filter = EnvFilter::from_default_env();
    match format!("catalog_fetcher={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", level, e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
