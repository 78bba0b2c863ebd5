//! Command handlers for Catalog Fetcher CLI
//!
//! This module implements the command handlers that connect CLI arguments,
//! the loaded configuration and the core application functionality.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::catalog::{
    load_image_dataset, load_product_dataset, work_set_from_documents, work_set_from_file,
    work_set_from_images,
};
use crate::app::{
    create_shutdown_channel, CatalogClient, CatalogExtractor, DownloadManager, DownloadSummary,
    ProgressStore, RunStatus, SignalHandler, WorkSet,
};
use crate::cli::{
    ConfigAction, ConfigArgs, DownloadArgs, Job, JobArgs, ProgressConfig, ProgressDisplay,
    ScrapeArgs,
};
use crate::config::AppConfig;
use crate::constants::progress::{EVENT_CHANNEL_CAPACITY, SPINNER_TICK_MS};
use crate::errors::{AppError, Result};

/// Number of items listed by previews
const PREVIEW_ITEMS: usize = 10;

/// Handle the scrape command
///
/// Removes stale datasets, walks every category and writes the product and
/// image datasets into the data directory.
pub async fn handle_scrape(args: ScrapeArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    let mut extractor_config = config.extractor_config();
    if let Some(categories) = args.categories {
        extractor_config.categories_file = categories;
    }
    info!(
        "Scraping catalog using categories from {}",
        extractor_config.categories_file.display()
    );

    let client = CatalogClient::with_endpoints(&config.client_config(), config.endpoints())?;
    let extractor = CatalogExtractor::new(client, extractor_config);
    extractor.remove_stale_datasets()?;

    let spinner = (!quiet).then(|| create_spinner("Scraping catalog..."));
    let result = extractor.scrape().await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let result = result?;

    let (product_path, image_path) = extractor.write_datasets(&result)?;

    if !quiet {
        println!("📦 Scrape Summary:");
        println!("  Products: {}", result.products.total_items);
        println!("  Image records: {}", result.images.total_items);
        println!(
            "  Search pages: {} ({} failed)",
            result.pages_requested, result.pages_failed
        );
        println!("  Product data: {}", product_path.display());
        println!("  Image data: {}", image_path.display());
        println!("  Total time: {:?}", start_time.elapsed());
    }

    Ok(())
}

/// Handle the download command
///
/// Resumes from the job's progress record when one exists; otherwise seeds
/// the run from the job's source. Ctrl-C stops the run after the current
/// item has been recorded.
pub async fn handle_download(args: DownloadArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;
    let job = args.job;

    let mut manager_config = config.manager_config(job.as_str());
    if let Some(output) = &args.output {
        manager_config.output_dir = output.clone();
    }
    if let Some(delay_ms) = args.delay_ms {
        manager_config = manager_config.with_inter_item_delay(Duration::from_millis(delay_ms));
    }
    if let Some(extension) = job.default_extension() {
        manager_config = manager_config.with_default_extension(extension);
    }

    let store = ProgressStore::new(config.job_progress_path(job.as_str()));
    let client = CatalogClient::with_endpoints(&config.client_config(), config.endpoints())?;

    if args.dry_run {
        return preview_download(&args, config, &client, &store).await;
    }

    info!(
        "Starting {} job into {} (record: {})",
        job,
        manager_config.output_dir.display(),
        store.path().display()
    );

    let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
    let signal_handle = SignalHandler::new(shutdown_tx).setup();

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let display = ProgressDisplay::new(ProgressConfig {
        quiet,
        ..Default::default()
    })
    .spawn(event_rx);

    if !quiet {
        println!("🚀 Starting {} downloads...", job);
    }

    let summary = {
        let mut manager = DownloadManager::new(manager_config, store, client.asset_fetcher())
            .with_events(event_tx)
            .with_shutdown(shutdown_rx);
        manager
            .run(|| build_seed(job, &args, config, &client, quiet))
            .await
    };

    // The manager (and its event sender) is gone, so the display drains and ends
    if let Err(e) = display.await {
        debug!("Progress display task ended abnormally: {}", e);
    }
    signal_handle.abort();

    let summary = summary?;
    if !quiet {
        print_summary(&summary);
    }
    Ok(())
}

/// Handle the status command
pub async fn handle_status(args: JobArgs, config: &AppConfig) -> Result<()> {
    let store = ProgressStore::new(config.job_progress_path(args.job.as_str()));

    match store.load()? {
        None => {
            println!("✅ No pending downloads for job '{}'", args.job);
            println!("   Record: {} (absent)", store.path().display());
        }
        Some(pending) => {
            println!(
                "📋 Job '{}' has {} pending items",
                args.job,
                pending.len()
            );
            println!("   Record: {}", store.path().display());
            print_preview(&pending);
        }
    }

    Ok(())
}

/// Handle the reset command
pub async fn handle_reset(args: JobArgs, config: &AppConfig) -> Result<()> {
    let store = ProgressStore::new(config.job_progress_path(args.job.as_str()));

    if !store.exists() {
        println!("ℹ️  No progress record for job '{}'", args.job);
        return Ok(());
    }

    store.clear()?;
    info!("Removed progress record {}", store.path().display());
    println!(
        "🗑️  Removed progress record for job '{}'; the next run starts fresh",
        args.job
    );
    Ok(())
}

/// Handle configuration commands
pub async fn handle_config(
    args: ConfigArgs,
    config: &AppConfig,
    config_path: Option<PathBuf>,
) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => AppConfig::get_default_config_path()?,
            };

            if path.exists() && !force {
                println!("Configuration already exists: {}", path.display());
                println!("Use --force to overwrite it.");
                return Ok(());
            }

            AppConfig::write_default_config(&path).await?;
            println!("📁 Wrote default configuration to {}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Derive a fresh seed for `job`
async fn build_seed(
    job: Job,
    args: &DownloadArgs,
    config: &AppConfig,
    client: &CatalogClient,
    quiet: bool,
) -> Result<WorkSet> {
    let mut seed = match job {
        Job::List => {
            let path = args.input.clone().unwrap_or_else(|| config.work_list_path());
            work_set_from_file(&path)?
        }
        Job::Images => {
            let path = args.input.clone().unwrap_or_else(|| config.image_data_path());
            work_set_from_images(&load_image_dataset(&path)?)
        }
        Job::Documents => {
            let path = args.input.clone().unwrap_or_else(|| config.product_data_path());
            let dataset = load_product_dataset(&path)?;

            let spinner = (!quiet).then(|| {
                create_spinner(&format!(
                    "Looking up SDS documents for {} products...",
                    dataset.products.len()
                ))
            });
            let seed = work_set_from_documents(
                &dataset,
                client,
                Duration::from_millis(config.catalog.detail_delay_ms),
            )
            .await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            seed
        }
        Job::Catalog => {
            let mut extractor_config = config.extractor_config();
            if let Some(path) = &args.input {
                extractor_config.categories_file = path.clone();
            }
            let extractor = CatalogExtractor::new(client.clone(), extractor_config);

            let spinner = (!quiet).then(|| create_spinner("Listing catalog images..."));
            let seed = extractor.list_work_items().await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            seed?
        }
    };

    if let Some(limit) = args.limit {
        if seed.len() > limit {
            info!("Limiting seed to {} items (from {})", limit, seed.len());
            seed.truncate(limit);
        }
    }

    info!("Fresh seed for {} job has {} items", job, seed.len());
    Ok(seed)
}

async fn preview_download(
    args: &DownloadArgs,
    config: &AppConfig,
    client: &CatalogClient,
    store: &ProgressStore,
) -> Result<()> {
    let (pending, source) = match store.load()? {
        Some(record) => (record, "progress record"),
        None => (
            build_seed(args.job, args, config, client, false).await?,
            "fresh seed",
        ),
    };

    println!(
        "Dry run - would process {} items from the {}:",
        pending.len(),
        source
    );
    print_preview(&pending);
    Ok(())
}

fn print_preview(pending: &WorkSet) {
    for (i, item) in pending.iter().take(PREVIEW_ITEMS).enumerate() {
        println!("  {}. {} ({})", i + 1, item.identifier, item.source_url);
    }
    if pending.len() > PREVIEW_ITEMS {
        println!("  ... and {} more items", pending.len() - PREVIEW_ITEMS);
    }
}

fn print_summary(summary: &DownloadSummary) {
    println!("\n📊 Download Summary:");
    println!("  Total items: {}", summary.total);
    println!("  Downloaded: {}", summary.succeeded);
    println!("  Already present: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    println!("  Remaining: {}", summary.remaining);
    println!("  Download time: {:?}", summary.duration);

    if !summary.failures.is_empty() {
        println!("\nFailed items:");
        for failure in summary.failures.iter().take(PREVIEW_ITEMS) {
            println!("  • {}: {}", failure.identifier, failure.error);
        }
        if summary.failures.len() > PREVIEW_ITEMS {
            println!("  ... and {} more", summary.failures.len() - PREVIEW_ITEMS);
        }
    }

    match summary.status {
        RunStatus::Complete => println!("\n✅ {}", summary.status_message()),
        RunStatus::Partial { .. } | RunStatus::Cancelled { .. } => {
            warn!("Download run ended with items remaining");
            println!("\n⚠️  {}", summary.status_message());
        }
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    spinner
}
