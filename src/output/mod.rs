//! Output module for the run's report and console summary

mod json;
pub mod stats;

pub use json::{write_report, ScrapeReport};
pub use stats::print_summary;
