//! Result writers for `neo query`.
//!
//! Three formats are supported:
//!
//! | Format     | Destination            |
//! |------------|------------------------|
//! | `display`  | one line per result on stdout |
//! | `csv_file` | `output.csv_path`, parent dirs created |
//! | `json`     | pretty JSON array on stdout |
//!
//! Writers are generic over [`Write`] so they can be tested against a
//! buffer; [`write_results`] picks the real destination.

use anyhow::{Context, Result};
use neo_search_core::{ApproachEvent, CatalogEntry, CatalogIndex, SearchResults};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::OutputConfig;

/// How query results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Display,
    #[value(name = "csv_file")]
    CsvFile,
    Json,
}

const CSV_HEADER: [&str; 5] = ["id", "name", "diameter_min_km", "orbits", "orbit_dates"];

/// Write `results` in `format`, resolving event owners through `index`.
pub fn write_results(
    results: &SearchResults<'_>,
    index: &CatalogIndex,
    format: OutputFormat,
    output: &OutputConfig,
) -> Result<()> {
    match format {
        OutputFormat::Display => {
            let stdout = std::io::stdout();
            write_display(&mut stdout.lock(), results)
        }
        OutputFormat::Json => {
            let stdout = std::io::stdout();
            write_json(&mut stdout.lock(), results)
        }
        OutputFormat::CsvFile => {
            let path = &output.csv_path;
            let file = create_output_file(path)?;
            let mut writer = BufWriter::new(file);
            write_csv(&mut writer, results, index)?;
            writer
                .flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {} result(s) to {}", results.len(), path.display());
            Ok(())
        }
    }
}

fn create_output_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))
}

pub fn write_display<W: Write>(out: &mut W, results: &SearchResults<'_>) -> Result<()> {
    if results.is_empty() {
        writeln!(out, "No results.")?;
        return Ok(());
    }
    match results {
        SearchResults::Entries(entries) => {
            for entry in entries {
                writeln!(out, "{}", display_entry(entry))?;
            }
        }
        SearchResults::Events(events) => {
            for event in events {
                writeln!(out, "{}", display_event(event))?;
            }
        }
    }
    Ok(())
}

pub fn display_entry(entry: &CatalogEntry) -> String {
    format!(
        "NEO id:{} name:{} diameter_min_km:{} hazardous:{} orbit_dates:[{}]",
        entry.id,
        entry.name,
        entry.diameter_min_km,
        entry.is_hazardous,
        entry.event_dates().join(", ")
    )
}

pub fn display_event(event: &ApproachEvent) -> String {
    format!(
        "Path name:{} date:{} miss_distance_km:{}",
        event.entry_name,
        event.date.as_deref().unwrap_or("-"),
        event.miss_distance_km
    )
}

pub fn write_json<W: Write>(out: &mut W, results: &SearchResults<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

/// Write a header plus one row per result.
///
/// Event rows describe the owning entry but list only that one event.
pub fn write_csv<W: Write>(
    out: &mut W,
    results: &SearchResults<'_>,
    index: &CatalogIndex,
) -> Result<()> {
    write_csv_row(out, &CSV_HEADER.map(String::from))?;
    match results {
        SearchResults::Entries(entries) => {
            for entry in entries {
                write_csv_row(out, &csv_row(entry, entry.events.iter()))?;
            }
        }
        SearchResults::Events(events) => {
            for event in events {
                let entry = index.get(&event.entry_name).with_context(|| {
                    format!("approach event owner '{}' is not indexed", event.entry_name)
                })?;
                write_csv_row(out, &csv_row(entry, std::iter::once(*event)))?;
            }
        }
    }
    Ok(())
}

fn csv_row<'a>(
    entry: &CatalogEntry,
    events: impl Iterator<Item = &'a ApproachEvent>,
) -> [String; 5] {
    let (orbits, dates): (Vec<String>, Vec<String>) = events
        .map(|e| (e.entry_name.clone(), e.date.clone().unwrap_or_default()))
        .unzip();
    [
        entry.id.clone(),
        entry.name.clone(),
        entry.diameter_min_km.to_string(),
        orbits.join(";"),
        dates.join(";"),
    ]
}

fn write_csv_row<W: Write>(out: &mut W, fields: &[String]) -> Result<()> {
    let line: Vec<String> = fields.iter().map(|f| quote_field(f)).collect();
    writeln!(out, "{}", line.join(","))?;
    Ok(())
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
