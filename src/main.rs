//! Gallery-Scout main entry point
//!
//! This is the command-line interface for the Gallery-Scout album scraper.

use clap::Parser;
use gallery_scout::config::load_config_with_hash;
use gallery_scout::crawler::run_scrape;
use gallery_scout::output::{print_summary, write_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Gallery-Scout: a paginated photo-gallery scraper
///
/// Gallery-Scout crawls a gallery site's category listings, collects album
/// records, optionally fetches a handful of image URLs per album, and writes
/// everything to a single JSON report.
#[derive(Parser, Debug)]
#[command(name = "gallery-scout")]
#[command(version)]
#[command(about = "A paginated photo-gallery scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Skip the image enrichment pass
    #[arg(long)]
    no_images: bool,

    /// Override the report output path from the config
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Apply CLI overrides
    if cli.no_images {
        config.output.enrich = false;
    }
    if let Some(path) = &cli.output {
        config.output.json_path = path.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_scrape(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gallery_scout=info,warn"),
            1 => EnvFilter::new("gallery_scout=debug,info"),
            2 => EnvFilter::new("gallery_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &gallery_scout::Config, config_hash: &str) {
    println!("=== Gallery-Scout Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!(
        "  Blocked title tokens: {}",
        config.site.blocked_title_tokens.join(", ")
    );

    println!("\nCrawler:");
    println!(
        "  Albums per category: {}",
        config.crawler.albums_per_category
    );
    println!(
        "  Page ceiling per category: {}",
        config.crawler.max_pages_per_category
    );
    println!("  Images per album: {}", config.crawler.images_per_album);
    println!(
        "  Enrichment pool size: {}",
        config.crawler.enrich_concurrency
    );
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);

    println!("\nOutput:");
    println!("  Report: {}", config.output.json_path);
    println!(
        "  Enrichment: {}",
        if config.output.enrich { "on" } else { "off" }
    );

    if !config.categories.is_empty() {
        println!("\nCategories ({}):", config.categories.len());
        for entry in &config.categories {
            println!("  - {} ({}): {}", entry.name, entry.id, entry.url);
        }
    }

    if let Some(range) = &config.pages {
        println!("\nPage range: {}..={}", range.start, range.end);
    }

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the main scrape operation
async fn handle_scrape(config: gallery_scout::Config) -> anyhow::Result<()> {
    let output_path = PathBuf::from(&config.output.json_path);

    if !config.categories.is_empty() {
        tracing::info!("Scraping {} categories", config.categories.len());
    }

    let (albums, stats) = match run_scrape(config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!("Writing report to {}", output_path.display());
    write_report(&output_path, &stats, &albums)?;

    print_summary(&stats, &output_path);

    Ok(())
}
