//! Image enrichment pipeline
//!
//! Given the collected album records, fetches each album's detail page and
//! writes up to `images_per_album` image URLs back into the record. Fetches
//! are bounded by a fixed-size concurrency pool; each unit of work owns
//! exactly one record index, results are written back by the awaiting
//! caller, and the collection's length and order are never touched.
//!
//! Per-record failures are logged and counted, never aborting sibling units.
//! Re-running the pipeline overwrites `images` with a freshly fetched
//! sequence rather than appending.

use crate::crawler::extractor::extract_album_images;
use crate::crawler::fetcher::Fetcher;
use crate::model::AlbumRecord;
use crate::ScoutError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Tuning for one enrichment pass
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Pool size; 1 selects the sequential path with an inter-record delay
    pub concurrency: usize,

    /// Maximum image URLs stored per album
    pub images_per_album: usize,

    /// Politeness delay for detail-page fetches
    pub request_delay: Duration,
}

/// Result of one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    /// Records whose images field was written
    pub enriched: usize,

    /// Records whose detail-page fetch failed (images left as-is)
    pub failed: usize,
}

/// Enriches every record with image URLs from its detail page
///
/// Waits for all units to complete before returning. Ordinarily returns Ok
/// even with partial per-record failures; the outcome carries the counts.
pub async fn enrich_albums(
    client: &Client,
    albums: &mut [AlbumRecord],
    options: &EnrichOptions,
) -> Result<EnrichOutcome, ScoutError> {
    if albums.is_empty() {
        return Ok(EnrichOutcome::default());
    }

    if options.concurrency <= 1 {
        return enrich_sequential(client, albums, options).await;
    }

    let semaphore = Arc::new(Semaphore::new(options.concurrency));
    let total = albums.len();
    let mut tasks: JoinSet<(usize, Option<Vec<String>>)> = JoinSet::new();

    for (index, album) in albums.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let client = client.clone();
        let album_url = album.album_url.clone();
        let title = album.title.clone();
        let limit = options.images_per_album;
        let delay = options.request_delay;

        tasks.spawn(async move {
            // One pool slot per in-flight detail fetch
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (index, None),
            };

            tracing::debug!("[{}/{}] fetching album page: {}", index + 1, total, title);

            // Fresh fetcher: politeness timer isolated from the listing crawl
            let fetcher = Fetcher::new(client, 1, delay);
            (index, fetch_album_images(&fetcher, &album_url, limit).await)
        });
    }

    let mut outcome = EnrichOutcome::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Some(images))) => {
                tracing::debug!("  {} images for album index {}", images.len(), index);
                albums[index].images = images;
                outcome.enriched += 1;
            }
            Ok((_, None)) => outcome.failed += 1,
            Err(e) => {
                tracing::warn!("enrichment task failed to join: {}", e);
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Degenerate single-worker variant
///
/// Functionally equivalent to the pooled path with concurrency 1, but with
/// an explicit politeness sleep between records instead of a shared
/// dispatch timer.
async fn enrich_sequential(
    client: &Client,
    albums: &mut [AlbumRecord],
    options: &EnrichOptions,
) -> Result<EnrichOutcome, ScoutError> {
    let fetcher = Fetcher::new(client.clone(), 1, Duration::ZERO);
    let mut outcome = EnrichOutcome::default();

    for (index, album) in albums.iter_mut().enumerate() {
        if index > 0 && !options.request_delay.is_zero() {
            tokio::time::sleep(options.request_delay).await;
        }

        match fetch_album_images(&fetcher, &album.album_url, options.images_per_album).await {
            Some(images) => {
                album.images = images;
                outcome.enriched += 1;
            }
            None => outcome.failed += 1,
        }
    }

    Ok(outcome)
}

/// Fetches one album detail page and extracts its image URLs
///
/// Returns None on fetch failure; the record's images field is left at its
/// current value and siblings are unaffected.
async fn fetch_album_images(fetcher: &Fetcher, album_url: &str, limit: usize) -> Option<Vec<String>> {
    match fetcher.fetch_text(album_url).await {
        Ok(body) => Some(extract_album_images(&body, limit)),
        Err(e) => {
            tracing::warn!("failed to fetch album page {}: {}", album_url, e);
            None
        }
    }
}
