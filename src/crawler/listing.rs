//! Listing crawler - walks paginated category listings
//!
//! This module drives the fetcher across successive listing pages, applies
//! the acceptance rules and caps, and appends validated album records to the
//! shared ordered collection. Pagination is strictly sequential: page n+1 is
//! never dispatched before page n's outcome is known, because the stop
//! condition depends on it.

use crate::config::{CategoryEntry, Config, PageRange};
use crate::crawler::enrich::{enrich_albums, EnrichOptions};
use crate::crawler::extractor::extract_album_links;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::model::{AlbumRecord, RunStats};
use crate::ScoutError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Caps applied to one category's pagination
#[derive(Debug, Clone, Copy)]
struct PageCaps {
    /// Maximum accepted records for the category
    album_cap: u32,
    /// Absolute page ceiling for the category
    page_ceiling: u32,
}

/// Why a category's pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    /// The current page yielded no new records
    Exhausted,
    /// The per-category album cap was reached
    AlbumCapReached,
    /// The next page would exceed the absolute page ceiling
    PageCeiling,
}

/// Next step after evaluating a page's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageDecision {
    /// Visit the given page next
    Continue(u32),
    /// Stop paginating this category
    Stop(StopReason),
}

/// Decides whether pagination continues after page `page`
///
/// The transition to page n+1 requires all of: at least one record accepted
/// on page n, the category's accepted count below the album cap, and the
/// next page within the page ceiling.
fn decide_next(page: u32, accepted_on_page: u32, accepted_total: u32, caps: PageCaps) -> PageDecision {
    if accepted_on_page == 0 {
        return PageDecision::Stop(StopReason::Exhausted);
    }
    if accepted_total >= caps.album_cap {
        return PageDecision::Stop(StopReason::AlbumCapReached);
    }
    if page + 1 > caps.page_ceiling {
        return PageDecision::Stop(StopReason::PageCeiling);
    }
    PageDecision::Continue(page + 1)
}

/// Builds the URL of a listing page
///
/// Page 1 is the bare listing URL; later pages append a `page` query
/// parameter, preserving any existing query.
fn page_url(listing_url: &Url, page: u32) -> Url {
    if page <= 1 {
        return listing_url.clone();
    }
    let mut url = listing_url.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url
}

/// Checks a title against the configured blocklist, case-insensitively
fn title_blocked(title: &str, tokens: &[String]) -> bool {
    let upper = title.to_uppercase();
    tokens
        .iter()
        .any(|token| upper.contains(&token.to_uppercase()))
}

/// The gallery scraper: listing crawl, enrichment, and statistics
///
/// The album collection is created empty at construction, appended to only
/// during the listing phase, and mutated in place (images field only) by the
/// enrichment pipeline. No deletions occur.
pub struct GalleryCrawler {
    config: Config,
    client: Client,
    fetcher: Fetcher,
    albums: Vec<AlbumRecord>,
    stats: RunStats,
}

impl GalleryCrawler {
    /// Creates a crawler from a validated configuration
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.user_agent)?;
        let fetcher = Fetcher::new(
            client.clone(),
            config.crawler.max_concurrent_requests,
            Duration::from_millis(config.crawler.request_delay_ms),
        );

        Ok(Self {
            config,
            client,
            fetcher,
            albums: Vec::new(),
            stats: RunStats::new(),
        })
    }

    /// Runs the listing phase to completion
    ///
    /// Crawls every configured category (or the configured page range), then
    /// stamps the end time and final album count on the run statistics.
    pub async fn run_listing(&mut self) -> Result<(), ScoutError> {
        if !self.config.categories.is_empty() {
            let categories = self.config.categories.clone();
            let total = categories.len();
            for (index, category) in categories.iter().enumerate() {
                tracing::info!("[{}/{}] Crawling category: {}", index + 1, total, category.name);
                self.crawl_category(category).await?;
            }
        } else if let Some(range) = self.config.pages {
            tracing::info!("Crawling pages {}..={} of {}", range.start, range.end, self.config.site.base_url);
            self.crawl_page_range(range).await?;
        }

        self.stats.finish(self.albums.len() as u64);
        tracing::info!(
            "Listing complete: {} albums across {} pages in {}",
            self.stats.total_albums,
            self.stats.total_pages,
            self.stats.duration
        );

        Ok(())
    }

    /// Walks one category's pages until a stop condition is hit
    async fn crawl_category(&mut self, category: &CategoryEntry) -> Result<(), ScoutError> {
        let listing_url = Url::parse(&category.url)?;
        let caps = PageCaps {
            album_cap: self.config.crawler.albums_per_category,
            page_ceiling: self.config.crawler.max_pages_per_category,
        };

        let mut page = 1u32;
        let mut accepted_total = 0u32;

        loop {
            let url = page_url(&listing_url, page);
            tracing::debug!("  visiting page {}: {}", page, url);

            let accepted_on_page = match self
                .visit_page(&url, &category.name, &mut accepted_total, true)
                .await
            {
                Some(count) => count,
                // Fetch failure ends this category's pagination, no retry
                None => break,
            };

            match decide_next(page, accepted_on_page, accepted_total, caps) {
                PageDecision::Continue(next) => page = next,
                PageDecision::Stop(reason) => {
                    tracing::debug!("  stopping category {}: {:?}", category.name, reason);
                    break;
                }
            }
        }

        tracing::info!(
            "  category {} complete: {} albums",
            category.name,
            accepted_total
        );
        Ok(())
    }

    /// Walks a flat page range against the gallery base URL
    ///
    /// Same acceptance rules as the categorized mode, minus the category
    /// label and the title blocklist; the album cap applies to the whole
    /// range.
    async fn crawl_page_range(&mut self, range: PageRange) -> Result<(), ScoutError> {
        let listing_url = Url::parse(&self.config.site.base_url)?;
        let album_cap = self.config.crawler.albums_per_category;
        let mut accepted_total = 0u32;

        for page in range.start..=range.end {
            let url = page_url(&listing_url, page);
            tracing::debug!("visiting page {}: {}", page, url);

            match self.visit_page(&url, "", &mut accepted_total, false).await {
                None => break,
                Some(0) => break,
                Some(_) if accepted_total >= album_cap => break,
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Visits one listing page and appends its accepted records
    ///
    /// Returns the number of records accepted on the page, or None when the
    /// fetch failed. Candidates past the album cap are discarded at the
    /// boundary, so the cap is exact even mid-page.
    async fn visit_page(
        &mut self,
        url: &Url,
        category_name: &str,
        accepted_total: &mut u32,
        apply_blocklist: bool,
    ) -> Option<u32> {
        let album_cap = self.config.crawler.albums_per_category;

        let body = match self.fetcher.fetch_text(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("failed to fetch {}: {}", url, e);
                self.stats.failed_scans += 1;
                return None;
            }
        };

        self.stats.total_pages += 1;

        let mut accepted_on_page = 0u32;
        for mut record in extract_album_links(&body, url) {
            if *accepted_total >= album_cap {
                tracing::debug!("album cap {} reached, discarding remainder", album_cap);
                break;
            }

            if apply_blocklist
                && title_blocked(&record.title, &self.config.site.blocked_title_tokens)
            {
                tracing::debug!("blocked title: {}", record.title);
                continue;
            }

            record.category = category_name.to_string();
            tracing::debug!(
                "  accepted album: {} (id {}, {} images)",
                record.title,
                record.id,
                record.image_count
            );

            self.albums.push(record);
            self.stats.successful_scans += 1;
            *accepted_total += 1;
            accepted_on_page += 1;
        }

        Some(accepted_on_page)
    }

    /// Runs the image enrichment pass over the collected albums
    pub async fn enrich(&mut self) -> Result<(), ScoutError> {
        if self.albums.is_empty() {
            tracing::info!("No albums to enrich");
            return Ok(());
        }

        tracing::info!(
            "Enriching {} albums (pool size {})",
            self.albums.len(),
            self.config.crawler.enrich_concurrency
        );

        let options = EnrichOptions {
            concurrency: self.config.crawler.enrich_concurrency,
            images_per_album: self.config.crawler.images_per_album,
            request_delay: Duration::from_millis(self.config.crawler.request_delay_ms),
        };

        let outcome = enrich_albums(&self.client, &mut self.albums, &options).await?;
        self.stats.enrichment_failures = outcome.failed as u64;

        tracing::info!(
            "Enrichment complete: {} enriched, {} failed",
            outcome.enriched,
            outcome.failed
        );
        Ok(())
    }

    /// Returns the run statistics accumulated so far
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Returns the album collection accumulated so far
    pub fn albums(&self) -> &[AlbumRecord] {
        &self.albums
    }

    /// Consumes the crawler, yielding the final collection and statistics
    pub fn finish(self) -> (Vec<AlbumRecord>, RunStats) {
        (self.albums, self.stats)
    }
}
