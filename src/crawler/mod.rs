//! Crawler module for listing and album-page scraping
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with politeness controls
//! - Extraction rules for album links and album images
//! - Paginated listing crawl with caps and stop conditions
//! - The bounded concurrent image enrichment pipeline

mod enrich;
mod extractor;
mod fetcher;
mod listing;

pub use enrich::{enrich_albums, EnrichOptions, EnrichOutcome};
pub use extractor::{extract_album_images, extract_album_links, page_from_url};
pub use fetcher::{build_http_client, Fetcher};
pub use listing::GalleryCrawler;

use crate::config::Config;
use crate::model::{AlbumRecord, RunStats};
use crate::Result;

/// Runs a complete scrape: listing phase, optional enrichment, statistics
///
/// The listing crawl runs to completion first, producing the album
/// collection; the enrichment pipeline then mutates it in place (images
/// only) when enabled in the configuration.
///
/// # Returns
///
/// The final album collection and the run statistics snapshot.
pub async fn run_scrape(config: Config) -> Result<(Vec<AlbumRecord>, RunStats)> {
    let enrich = config.output.enrich;

    let mut crawler = GalleryCrawler::new(config)?;
    crawler.run_listing().await?;

    if enrich {
        crawler.enrich().await?;
    } else {
        tracing::info!("Image enrichment disabled, skipping");
    }

    Ok(crawler.finish())
}
