//! Catalog statistics.
//!
//! Loads the catalog and prints a summary of what was indexed: object and
//! approach counts, the date span, and how many records were skipped.
//! Used by `neo stats` as a quick check that a data file is readable.

use anyhow::Result;
use neo_search_core::{IndexStats, LoadReport};
use std::path::Path;

use crate::config::Config;
use crate::ingest::load_catalog;
use crate::progress::LoadProgressReporter;

pub fn run_stats(config: &Config, progress: &dyn LoadProgressReporter) -> Result<()> {
    let (index, report) = load_catalog(&config.data.path, config.ingest.on_error, progress)?;
    print!("{}", render_stats(&config.data.path, &index.stats(), &report));
    Ok(())
}

fn render_stats(path: &Path, stats: &IndexStats, report: &LoadReport) -> String {
    let mut out = String::new();
    out.push_str("NEO Catalog Stats\n");
    out.push_str("=================\n\n");
    out.push_str(&format!("  Catalog:     {}\n", path.display()));
    out.push_str(&format!("  Records:     {} loaded", report.loaded));
    if !report.skipped.is_empty() {
        out.push_str(&format!(", {} skipped", report.skipped.len()));
    }
    out.push('\n');
    out.push('\n');
    out.push_str(&format!("  Objects:     {}\n", stats.entries));
    out.push_str(&format!(
        "  Hazardous:   {} ({}%)\n",
        stats.hazardous_entries,
        if stats.entries > 0 {
            stats.hazardous_entries * 100 / stats.entries
        } else {
            0
        }
    ));
    out.push_str(&format!("  Approaches:  {}\n", stats.events));
    out.push_str(&format!("  Dates:       {}\n", stats.dates));
    match (&stats.earliest_date, &stats.latest_date) {
        (Some(first), Some(last)) => {
            out.push_str(&format!("  Span:        {} .. {}\n", first, last))
        }
        _ => out.push_str("  Span:        (no dated approaches)\n"),
    }

    if !report.skipped.is_empty() {
        out.push_str("\n  Skipped:\n");
        for err in report.skipped.iter().take(10) {
            out.push_str(&format!("    {}\n", err));
        }
        if report.skipped.len() > 10 {
            out.push_str(&format!("    ... and {} more\n", report.skipped.len() - 10));
        }
    }
    out
}
