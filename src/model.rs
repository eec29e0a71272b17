//! Data model for scraped albums and run statistics

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One crawled album listing with its location metadata
///
/// Records are appended during the listing phase and only their `images`
/// field is touched afterwards, by the enrichment pipeline. The same album
/// may legitimately appear under multiple categories; the collection is a
/// list, not a set, and no dedup is performed.
#[derive(Debug, Clone, Serialize)]
pub struct AlbumRecord {
    /// External album identifier parsed from the detail-page link
    pub id: String,

    /// Album title from the link's `title` attribute or its text content
    pub title: String,

    /// Image count advertised on the listing, 0 if unparseable
    pub image_count: u32,

    /// Image URLs filled in by the enrichment pass (at most `images-per-album`)
    pub images: Vec<String>,

    /// Display name of the category being crawled when the record was found
    /// (empty in page-range mode)
    pub category: String,

    /// Listing page the record was found on (1-based)
    pub page_number: u32,

    /// Fully-qualified URL of the album's detail page
    pub album_url: String,

    /// Discovery timestamp
    pub scraped_at: DateTime<Utc>,
}

/// Accumulated counters and timing for one scrape run
///
/// All counters are monotonically non-decreasing during a run. The end time
/// is stamped once, when the listing phase concludes; `enrichment_failures`
/// is filled in after the enrichment pipeline drains.
#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    /// Listing pages successfully visited
    pub total_pages: u64,

    /// Final length of the album collection
    pub total_albums: u64,

    /// Accepted album records
    pub successful_scans: u64,

    /// Failed page fetches during the listing phase
    pub failed_scans: u64,

    /// Albums whose detail-page fetch failed during enrichment
    pub enrichment_failures: u64,

    /// When the run started
    pub start_time: DateTime<Utc>,

    /// When the listing phase ended
    pub end_time: Option<DateTime<Utc>>,

    /// Wall-clock duration of the listing phase, formatted for display
    pub duration: String,
}

impl RunStats {
    /// Creates fresh statistics with the start time stamped now
    pub fn new() -> Self {
        Self {
            total_pages: 0,
            total_albums: 0,
            successful_scans: 0,
            failed_scans: 0,
            enrichment_failures: 0,
            start_time: Utc::now(),
            end_time: None,
            duration: String::new(),
        }
    }

    /// Stamps the end time and records the final collection length
    pub fn finish(&mut self, total_albums: u64) {
        let end = Utc::now();
        self.duration = format_duration(end - self.start_time);
        self.end_time = Some(end);
        self.total_albums = total_albums;
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a duration as `1h2m3.456s` / `2m3.456s` / `3.456s`
fn format_duration(duration: chrono::Duration) -> String {
    let millis = duration.num_milliseconds().max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) as f64 / 1000.0;

    if hours > 0 {
        format!("{}h{}m{:.3}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:.3}s", minutes, seconds)
    } else {
        format!("{:.3}s", seconds)
    }
}
