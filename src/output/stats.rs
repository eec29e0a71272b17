//! Console summary of a completed run

use crate::model::RunStats;
use std::path::Path;

/// Prints the final run statistics to stdout in a formatted manner
pub fn print_summary(stats: &RunStats, output_path: &Path) {
    println!("=== Scrape Summary ===\n");

    println!("Pages visited:        {}", stats.total_pages);
    println!("Albums found:         {}", stats.total_albums);
    println!("Accepted records:     {}", stats.successful_scans);
    println!("Failed page fetches:  {}", stats.failed_scans);
    println!("Enrichment failures:  {}", stats.enrichment_failures);
    println!("Duration:             {}", stats.duration);
    println!("Output:               {}", output_path.display());

    let attempted = stats.total_pages + stats.failed_scans;
    if attempted > 0 {
        let rate = (stats.total_pages as f64 / attempted as f64) * 100.0;
        println!(
            "\nPage fetch success rate: {:.1}% ({} / {} pages)",
            rate, stats.total_pages, attempted
        );
    }
}
