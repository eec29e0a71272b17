//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the gallery site and exercise
//! the listing crawl and the enrichment pipeline end-to-end.

use gallery_scout::config::{
    CategoryEntry, Config, CrawlerConfig, OutputConfig, PageRange, SiteConfig, UserAgentConfig,
};
use gallery_scout::crawler::{enrich_albums, run_scrape, EnrichOptions};
use gallery_scout::model::AlbumRecord;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointed at a mock server
fn test_config(base_url: &str, categories: Vec<CategoryEntry>, pages: Option<PageRange>) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            blocked_title_tokens: vec!["NBA".to_string(), "NFL".to_string()],
        },
        crawler: CrawlerConfig {
            albums_per_category: 15,
            max_pages_per_category: 50,
            images_per_album: 3,
            enrich_concurrency: 3,
            max_concurrent_requests: 5,
            request_delay_ms: 0, // No politeness delay in tests
        },
        user_agent: UserAgentConfig {
            scraper_name: "TestScraper".to_string(),
            scraper_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            json_path: "./test_albums.json".to_string(),
            enrich: false,
        },
        categories,
        pages,
    }
}

fn category(id: &str, name: &str, base_url: &str) -> CategoryEntry {
    CategoryEntry {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("{}/categories/{}", base_url, id),
    }
}

fn album_record(id: u32, base_url: &str) -> AlbumRecord {
    AlbumRecord {
        id: id.to_string(),
        title: format!("Kit {}", id),
        image_count: 0,
        images: Vec::new(),
        category: String::new(),
        page_number: 1,
        album_url: format!("{}/albums/{}", base_url, id),
        scraped_at: chrono::Utc::now(),
    }
}

fn album_link(id: u32, title: &str, count: u32) -> String {
    format!(
        r#"<a href="/albums/{}?uid=1" title="{}">{}</a>"#,
        id, title, count
    )
}

fn listing_page(links: &[String]) -> String {
    format!("<html><body>{}</body></html>", links.join("\n"))
}

async fn mount_page(server: &MockServer, route: &str, page: Option<u32>, body: String) {
    let mut mock = Mock::given(method("GET")).and(path(route));
    if let Some(n) = page {
        mock = mock.and(query_param("page", n.to_string()));
    }
    mock.respond_with(
        ResponseTemplate::new(200)
            .set_body_string(body)
            .insert_header("content-type", "text/html"),
    )
    .mount(server)
    .await;
}

/// Responder that records when each request arrived and holds the response
/// open for a fixed delay, so overlapping fetch windows can be counted.
struct DelayedPage {
    body: String,
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for DelayedPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_string(self.body.clone())
            .insert_header("content-type", "text/html")
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_pagination_stops_after_empty_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Page 2 first: the more specific mock must be mounted before the bare one
    mount_page(
        &server,
        "/categories/661649",
        Some(2),
        listing_page(&[]),
    )
    .await;
    mount_page(
        &server,
        "/categories/661649",
        None,
        listing_page(&[
            album_link(101, "La Liga Home Kit", 12),
            album_link(102, "Premier Away Kit", 8),
        ]),
    )
    .await;

    let config = test_config(&base, vec![category("661649", "La Liga", &base)], None);
    let (albums, stats) = run_scrape(config).await.unwrap();

    // Both pages visited, the empty one terminated pagination
    assert_eq!(stats.total_pages, 2);
    assert_eq!(stats.successful_scans, 2);
    assert_eq!(stats.failed_scans, 0);
    assert_eq!(albums.len(), 2);

    // Accepted records always carry a non-empty id and title
    for album in &albums {
        assert!(!album.id.is_empty());
        assert!(!album.title.is_empty());
    }

    assert_eq!(albums[0].id, "101");
    assert_eq!(albums[0].title, "La Liga Home Kit");
    assert_eq!(albums[0].image_count, 12);
    assert_eq!(albums[0].category, "La Liga");
    assert_eq!(albums[0].page_number, 1);
    assert_eq!(albums[0].album_url, format!("{}/albums/101?uid=1", base));
}

#[tokio::test]
async fn test_album_cap_is_enforced_mid_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: Vec<String> = (1..=5)
        .map(|i| album_link(i, &format!("Kit {}", i), i))
        .collect();

    // The cap stops pagination, so exactly one listing request is expected
    Mock::given(method("GET"))
        .and(path("/categories/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&links))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&base, vec![category("7", "Serie A", &base)], None);
    config.crawler.albums_per_category = 3;

    let (albums, stats) = run_scrape(config).await.unwrap();

    assert_eq!(albums.len(), 3);
    assert_eq!(stats.successful_scans, 3);
    assert_eq!(albums[0].id, "1");
    assert_eq!(albums[2].id, "3");
}

#[tokio::test]
async fn test_blocklisted_titles_are_excluded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/categories/9", Some(2), listing_page(&[])).await;
    mount_page(
        &server,
        "/categories/9",
        None,
        listing_page(&[
            album_link(1, "nba Retro Jersey", 10),
            album_link(2, "NFL Special", 10),
            album_link(3, "Bundesliga Home", 10),
        ]),
    )
    .await;

    let config = test_config(&base, vec![category("9", "Retro", &base)], None);
    let (albums, _stats) = run_scrape(config).await.unwrap();

    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].title, "Bundesliga Home");
}

#[tokio::test]
async fn test_links_without_numeric_id_yield_no_records() {
    let server = MockServer::start().await;
    let base = server.uri();

    let body = r#"<html><body>
        <a href="/albums/" title="No id">10</a>
        <a href="/albums/abc?uid=1" title="Alpha id">10</a>
        <a href="/somewhere/else" title="Not an album">10</a>
    </body></html>"#;

    mount_page(&server, "/categories/5", None, body.to_string()).await;

    let config = test_config(&base, vec![category("5", "Retro", &base)], None);
    let (albums, stats) = run_scrape(config).await.unwrap();

    assert!(albums.is_empty());
    assert_eq!(stats.total_pages, 1);
    assert_eq!(stats.successful_scans, 0);
    // Invalid candidates are discarded silently, not counted as failures
    assert_eq!(stats.failed_scans, 0);
}

#[tokio::test]
async fn test_fetch_failure_aborts_category_but_not_run() {
    let server = MockServer::start().await;
    let base = server.uri();

    // First category's listing is broken
    Mock::given(method("GET"))
        .and(path("/categories/1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // Second category works
    mount_page(&server, "/categories/2", Some(2), listing_page(&[])).await;
    mount_page(
        &server,
        "/categories/2",
        None,
        listing_page(&[album_link(7, "Ligue 1 Home", 6)]),
    )
    .await;

    let config = test_config(
        &base,
        vec![
            category("1", "Broken", &base),
            category("2", "Working", &base),
        ],
        None,
    );
    let (albums, stats) = run_scrape(config).await.unwrap();

    assert_eq!(stats.failed_scans, 1);
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].category, "Working");
}

#[tokio::test]
async fn test_page_range_mode_crawls_flat() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", Some(3), listing_page(&[])).await;
    mount_page(
        &server,
        "/",
        Some(2),
        listing_page(&[album_link(2, "Kit Two", 4)]),
    )
    .await;
    mount_page(
        &server,
        "/",
        None,
        listing_page(&[album_link(1, "Kit One", 4)]),
    )
    .await;

    let config = test_config(&base, vec![], Some(PageRange { start: 1, end: 10 }));
    let (albums, stats) = run_scrape(config).await.unwrap();

    // Stopped on the zero-yield third page, well before the range's end
    assert_eq!(stats.total_pages, 3);
    assert_eq!(albums.len(), 2);
    assert_eq!(albums[0].page_number, 1);
    assert_eq!(albums[1].page_number, 2);
    // No category label in page-range mode
    assert!(albums.iter().all(|a| a.category.is_empty()));
}

#[tokio::test]
async fn test_enrichment_fills_images_preserving_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/categories/3", Some(2), listing_page(&[])).await;
    mount_page(
        &server,
        "/categories/3",
        None,
        listing_page(&[
            album_link(1, "Kit One", 4),
            album_link(2, "Kit Two", 4),
            album_link(3, "Kit Three", 4),
        ]),
    )
    .await;

    for id in 1..=3 {
        let body = format!(
            r#"<html><body>
                <img src="//photo.example.com/assets/logo.png">
                <img src="//photo.example.com/u/{id}/a/small.jpg">
                <img src="//photo.example.com/u/{id}/b/small.jpg">
                <img src="//photo.example.com/u/{id}/c/small.jpg">
                <img src="//photo.example.com/u/{id}/d/small.jpg">
            </body></html>"#
        );
        mount_page(&server, &format!("/albums/{}", id), None, body).await;
    }

    let mut config = test_config(&base, vec![category("3", "Premier", &base)], None);
    config.output.enrich = true;

    let (albums, stats) = run_scrape(config).await.unwrap();

    assert_eq!(albums.len(), 3);
    assert_eq!(stats.enrichment_failures, 0);

    // Order preserved, each record got its own images, capped at 3,
    // normalized to absolute medium-quality URLs, chrome skipped
    for (i, album) in albums.iter().enumerate() {
        let id = i + 1;
        assert_eq!(album.id, id.to_string());
        assert_eq!(
            album.images,
            vec![
                format!("https://photo.example.com/u/{}/a/medium.jpg", id),
                format!("https://photo.example.com/u/{}/b/medium.jpg", id),
                format!("https://photo.example.com/u/{}/c/medium.jpg", id),
            ]
        );
    }
}

#[tokio::test]
async fn test_enrichment_failure_leaves_record_untouched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/categories/4", Some(2), listing_page(&[])).await;
    mount_page(
        &server,
        "/categories/4",
        None,
        listing_page(&[album_link(1, "Kit One", 4), album_link(2, "Kit Two", 4)]),
    )
    .await;

    // Only album 1 has a working detail page; album 2 404s
    mount_page(
        &server,
        "/albums/1",
        None,
        r#"<img src="//photo.example.com/u/1/small.jpg">"#.to_string(),
    )
    .await;

    let mut config = test_config(&base, vec![category("4", "Retro", &base)], None);
    config.output.enrich = true;

    let (albums, stats) = run_scrape(config).await.unwrap();

    assert_eq!(albums.len(), 2);
    assert_eq!(stats.enrichment_failures, 1);
    assert_eq!(
        albums[0].images,
        vec!["https://photo.example.com/u/1/medium.jpg".to_string()]
    );
    assert!(albums[1].images.is_empty());
    // Listing-phase counters are untouched by enrichment
    assert_eq!(stats.successful_scans, 2);
    assert_eq!(stats.failed_scans, 0);
}

#[tokio::test]
async fn test_enrichment_is_idempotent() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/albums/1",
        None,
        r#"<img src="//photo.example.com/u/1/small.jpg">"#.to_string(),
    )
    .await;

    let mut albums = vec![album_record(1, &base)];

    let client = reqwest::Client::new();
    let options = EnrichOptions {
        concurrency: 3,
        images_per_album: 3,
        request_delay: Duration::ZERO,
    };

    let first = enrich_albums(&client, &mut albums, &options).await.unwrap();
    assert_eq!(first.enriched, 1);
    assert_eq!(albums[0].images.len(), 1);

    // A second pass overwrites rather than appending
    let second = enrich_albums(&client, &mut albums, &options).await.unwrap();
    assert_eq!(second.enriched, 1);
    assert_eq!(
        albums[0].images,
        vec!["https://photo.example.com/u/1/medium.jpg".to_string()]
    );
}

#[tokio::test]
async fn test_enrichment_in_flight_fetches_never_exceed_pool_size() {
    let server = MockServer::start().await;
    let base = server.uri();

    let delay = Duration::from_millis(150);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path_regex(r"^/albums/\d+$"))
        .respond_with(DelayedPage {
            body: r#"<img src="//photo.example.com/u/1/small.jpg">"#.to_string(),
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .mount(&server)
        .await;

    let mut albums: Vec<AlbumRecord> = (1..=10).map(|id| album_record(id, &base)).collect();

    let client = reqwest::Client::new();
    let options = EnrichOptions {
        concurrency: 3,
        images_per_album: 3,
        request_delay: Duration::ZERO,
    };

    let outcome = enrich_albums(&client, &mut albums, &options).await.unwrap();
    assert_eq!(outcome.enriched, 10);

    // Each request holds the server for `delay` after arrival, so the number
    // of windows still open at any arrival is the in-flight fetch count at
    // that instant. It must never exceed the pool size.
    let arrivals = arrivals.lock().unwrap();
    assert_eq!(arrivals.len(), 10);

    let max_in_flight = arrivals
        .iter()
        .map(|&t| arrivals.iter().filter(|&&s| s <= t && t < s + delay).count())
        .max()
        .unwrap();
    assert!(
        max_in_flight <= 3,
        "observed {} concurrent detail fetches with a pool of 3",
        max_in_flight
    );
}

#[tokio::test]
async fn test_sequential_enrichment_matches_pooled_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    for id in 1..=2 {
        mount_page(
            &server,
            &format!("/albums/{}", id),
            None,
            format!(r#"<img src="//photo.example.com/u/{id}/small.jpg">"#),
        )
        .await;
    }

    let client = reqwest::Client::new();

    let mut pooled: Vec<AlbumRecord> = (1..=2).map(|id| album_record(id, &base)).collect();
    let mut sequential: Vec<AlbumRecord> = (1..=2).map(|id| album_record(id, &base)).collect();

    let pooled_options = EnrichOptions {
        concurrency: 3,
        images_per_album: 3,
        request_delay: Duration::ZERO,
    };
    let sequential_options = EnrichOptions {
        concurrency: 1,
        images_per_album: 3,
        request_delay: Duration::from_millis(1),
    };

    enrich_albums(&client, &mut pooled, &pooled_options)
        .await
        .unwrap();
    enrich_albums(&client, &mut sequential, &sequential_options)
        .await
        .unwrap();

    for (a, b) in pooled.iter().zip(sequential.iter()) {
        assert_eq!(a.images, b.images);
    }
}
