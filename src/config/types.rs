use serde::Deserialize;

/// Main configuration structure for Gallery-Scout
///
/// Exactly one crawl mode must be configured: a list of `[[category]]`
/// entries, or a `[pages]` range crawled directly against the site base URL.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
    pub pages: Option<PageRange>,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Gallery base URL; page-range mode paginates this URL directly
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Tokens that reject an album title when matched case-insensitively
    /// (categorized mode only)
    #[serde(default = "default_blocked_tokens", rename = "blocked-title-tokens")]
    pub blocked_title_tokens: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum accepted albums per category (or per run in page-range mode)
    #[serde(default = "default_albums_per_category", rename = "albums-per-category")]
    pub albums_per_category: u32,

    /// Absolute pagination ceiling per category
    #[serde(
        default = "default_max_pages_per_category",
        rename = "max-pages-per-category"
    )]
    pub max_pages_per_category: u32,

    /// Maximum image URLs stored per album during enrichment
    #[serde(default = "default_images_per_album", rename = "images-per-album")]
    pub images_per_album: usize,

    /// Enrichment pool size; 1 selects the sequential path
    #[serde(default = "default_enrich_concurrency", rename = "enrich-concurrency")]
    pub enrich_concurrency: usize,

    /// Maximum in-flight requests per fetcher
    #[serde(
        default = "default_max_concurrent_requests",
        rename = "max-concurrent-requests"
    )]
    pub max_concurrent_requests: usize,

    /// Minimum delay between successive request dispatches (milliseconds)
    #[serde(default = "default_request_delay_ms", rename = "request-delay-ms")]
    pub request_delay_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "scraper-name")]
    pub scraper_name: String,

    /// Version of the scraper
    #[serde(rename = "scraper-version")]
    pub scraper_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON report
    #[serde(rename = "json-path")]
    pub json_path: String,

    /// Whether to run the image enrichment pass
    #[serde(default = "default_enrich")]
    pub enrich: bool,
}

/// One category to crawl, with its own paginated listing
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Category identifier on the target site
    pub id: String,

    /// Display name recorded on every album found under this category
    pub name: String,

    /// Listing URL of the category's first page
    pub url: String,
}

/// Inclusive page range for single-gallery mode
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

fn default_blocked_tokens() -> Vec<String> {
    vec!["NBA".to_string(), "NFL".to_string()]
}

fn default_albums_per_category() -> u32 {
    15
}

fn default_max_pages_per_category() -> u32 {
    50
}

fn default_images_per_album() -> usize {
    3
}

fn default_enrich_concurrency() -> usize {
    3
}

fn default_max_concurrent_requests() -> usize {
    2
}

fn default_request_delay_ms() -> u64 {
    2000
}

fn default_enrich() -> bool {
    true
}
