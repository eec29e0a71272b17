//! HTTP fetcher with politeness controls
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building an HTTP client with a proper user agent string
//! - GET requests for listing and album detail pages
//! - An in-flight request cap (semaphore)
//! - A minimum delay between successive request dispatches
//!
//! The two politeness controls are independent of the enrichment pipeline's
//! own pool: the effective concurrency against the host is the smaller of
//! the two limits.

use crate::config::UserAgentConfig;
use crate::ScoutError;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use gallery_scout::config::UserAgentConfig;
/// use gallery_scout::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     scraper_name: "GalleryScout".to_string(),
///     scraper_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: ScraperName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.scraper_name, config.scraper_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A rate-limited page fetcher
///
/// Each instance carries its own dispatch timer; the enrichment pipeline
/// builds a fresh instance per detail fetch so its politeness clock is
/// isolated from the listing crawl.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    limiter: Arc<Semaphore>,
    min_delay: Duration,
    next_dispatch: Arc<Mutex<Instant>>,
}

impl Fetcher {
    /// Creates a fetcher with the given in-flight cap and dispatch delay
    pub fn new(client: Client, max_in_flight: usize, min_delay: Duration) -> Self {
        Self {
            client,
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
            min_delay,
            next_dispatch: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Fetches a URL and returns the response body
    ///
    /// Non-2xx responses and network errors are reported once per call and
    /// are non-fatal to the overall run: callers count the failure and move
    /// on to their next unit of work.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScoutError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| ScoutError::LimiterClosed)?;

        self.wait_for_dispatch_slot().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScoutError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ScoutError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Reserves the next dispatch slot and sleeps until it is due
    ///
    /// Slots are spaced `min_delay` apart, so successive dispatches through
    /// the same fetcher never fire closer together than the configured delay
    /// even when multiple requests are waiting.
    async fn wait_for_dispatch_slot(&self) {
        if self.min_delay.is_zero() {
            return;
        }

        let wait = {
            let mut next = self.next_dispatch.lock().await;
            let now = Instant::now();
            let slot = (*next).max(now);
            *next = slot + self.min_delay;
            slot.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
