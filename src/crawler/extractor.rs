//! Extraction rules for album listings and album detail pages
//!
//! All scraping-target-specific markup knowledge lives in this file: the
//! selectors below plus the id/src patterns they rely on. A markup change on
//! the target site should only ever be an edit here.
//!
//! Extraction rules never raise. A match that does not satisfy a rule's
//! validity requirements (missing href, no numeric id, empty title) is
//! silently skipped.

use crate::model::AlbumRecord;
use chrono::Utc;
use scraper::{Html, Selector};
use url::Url;

/// Album links on a listing page: hrefs with an album-path segment
const ALBUM_LINK_SELECTOR: &str = "a[href*='/albums/']";

/// Photo elements on an album detail page
const IMAGE_SELECTOR: &str = "img[src*='photo.']";

/// Src substrings that mark site chrome rather than album photos
const CHROME_MARKERS: &[&str] = &["logo", "icon"];

/// Extracts candidate album records from a listing page
///
/// Each matching link yields a record when it carries a numeric album id in
/// its href and a non-empty title (the `title` attribute, falling back to
/// the link text). The advertised image count is a best-effort parse of the
/// first newline-delimited line of the link text and stays 0 when that line
/// is not a non-negative integer. The page number is recovered from the
/// `page` query parameter of the originating request URL; absence means
/// page 1.
///
/// The `category` field is left empty; the listing crawler assigns it.
pub fn extract_album_links(html: &str, page_url: &Url) -> Vec<AlbumRecord> {
    let document = Html::parse_document(html);
    let mut records = Vec::new();

    let selector = match Selector::parse(ALBUM_LINK_SELECTOR) {
        Ok(s) => s,
        Err(_) => return records,
    };

    let page_number = page_from_url(page_url);

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) if !h.trim().is_empty() => h.trim(),
            _ => continue,
        };

        let album_url = match page_url.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };

        let id = match parse_album_id(&album_url) {
            Some(id) => id,
            None => continue,
        };

        let text = element.text().collect::<String>();

        let title = element
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| text.trim().to_string());
        if title.is_empty() {
            continue;
        }

        let image_count = text
            .trim()
            .lines()
            .next()
            .and_then(|line| line.trim().parse::<u32>().ok())
            .unwrap_or(0);

        records.push(AlbumRecord {
            id,
            title,
            image_count,
            images: Vec::new(),
            category: String::new(),
            page_number,
            album_url: album_url.to_string(),
            scraped_at: Utc::now(),
        });
    }

    records
}

/// Extracts up to `limit` image URLs from an album detail page
///
/// Matches are filtered to exclude recognizable site chrome and normalized:
/// scheme-relative srcs become absolute https URLs, and the thumbnail-size
/// path segment is rewritten to the higher-quality variant.
pub fn extract_album_images(html: &str, limit: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut images = Vec::new();

    let selector = match Selector::parse(IMAGE_SELECTOR) {
        Ok(s) => s,
        Err(_) => return images,
    };

    for element in document.select(&selector) {
        if images.len() >= limit {
            break;
        }

        if let Some(src) = element.value().attr("src") {
            if let Some(normalized) = normalize_image_src(src) {
                images.push(normalized);
            }
        }
    }

    images
}

/// Finds the numeric id segment following `albums` in the URL path
fn parse_album_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;

    while let Some(segment) = segments.next() {
        if segment == "albums" {
            return segments
                .next()
                .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
                .map(str::to_string);
        }
    }

    None
}

/// Reads the 1-based page number from a listing request URL
pub fn page_from_url(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1)
}

/// Normalizes an image src, or rejects it
///
/// Returns None for empty srcs and for chrome assets (logos/icons).
fn normalize_image_src(src: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    let lowered = src.to_lowercase();
    if CHROME_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return None;
    }

    let absolute = if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        src.to_string()
    };

    // Prefer the medium-quality variant over the listing thumbnail
    let upgraded = absolute
        .replacen("/small.jpg", "/medium.jpg", 1)
        .replacen("/small.jpeg", "/medium.jpeg", 1);

    Some(upgraded)
}
