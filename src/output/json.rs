//! JSON report writer
//!
//! Serializes the final album collection and run statistics into a single
//! document: `{ "stats": {...}, "albums": [...] }`. A write failure here is
//! fatal to the run; no partial-write recovery is attempted.

use crate::model::{AlbumRecord, RunStats};
use crate::ScoutError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The single output document of a run
#[derive(Debug, Serialize)]
pub struct ScrapeReport<'a> {
    pub stats: &'a RunStats,
    pub albums: &'a [AlbumRecord],
}

/// Writes the report document to `path` as pretty-printed JSON
pub fn write_report(
    path: &Path,
    stats: &RunStats,
    albums: &[AlbumRecord],
) -> Result<(), ScoutError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &ScrapeReport { stats, albums })?;
    writer.flush()?;

    Ok(())
}
