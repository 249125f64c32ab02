//! Core data models: catalog entries, their approach events, and the raw
//! records they are built from.
//!
//! A [`CatalogEntry`] is one uniquely named near-Earth object. Each close
//! approach recorded for it becomes an [`ApproachEvent`] appended to the
//! entry in ingestion order. Events refer back to their entry by name only.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{CatalogError, Result};

/// A raw ingested row: column name → unparsed string value.
pub type RawRecord = HashMap<String, String>;

/// Column names read from each [`RawRecord`].
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const DIAMETER_MIN_KM: &str = "estimated_diameter_min_kilometers";
    pub const HAZARDOUS: &str = "is_potentially_hazardous_asteroid";
    pub const MISS_DISTANCE_KM: &str = "miss_distance_kilometers";
    pub const APPROACH_DATE: &str = "close_approach_date";

    /// Every column a record must carry.
    pub const REQUIRED: [&str; 6] = [
        ID,
        NAME,
        DIAMETER_MIN_KM,
        HAZARDOUS,
        MISS_DISTANCE_KM,
        APPROACH_DATE,
    ];
}

/// Date format shared by records, queries, and the date index.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One uniquely named object in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub diameter_min_km: f64,
    pub is_hazardous: bool,
    /// Approach events in ingestion order.
    pub events: Vec<ApproachEvent>,
}

/// One close approach of a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachEvent {
    /// Name of the owning [`CatalogEntry`].
    pub entry_name: String,
    pub miss_distance_km: f64,
    /// `YYYY-MM-DD`, or `None` when the record left the date blank.
    pub date: Option<String>,
}

impl CatalogEntry {
    /// Build an entry (without events) from a raw record.
    pub fn from_record(record: &RawRecord) -> Result<Self> {
        Ok(Self {
            id: required(record, columns::ID)?.to_string(),
            name: required(record, columns::NAME)?.to_string(),
            diameter_min_km: parse_float(record, columns::DIAMETER_MIN_KM)?,
            is_hazardous: parse_flag(columns::HAZARDOUS, required(record, columns::HAZARDOUS)?)?,
            events: Vec::new(),
        })
    }

    pub fn add_event(&mut self, event: ApproachEvent) {
        self.events.push(event);
    }

    /// Dates of all events, in event order. Undated events are skipped.
    pub fn event_dates(&self) -> Vec<&str> {
        self.events.iter().filter_map(|e| e.date.as_deref()).collect()
    }
}

impl ApproachEvent {
    /// Build an event from a raw record.
    ///
    /// The date column must be present. A blank value yields an undated
    /// event; anything else must parse as `YYYY-MM-DD`.
    pub fn from_record(record: &RawRecord) -> Result<Self> {
        let entry_name = required(record, columns::NAME)?.to_string();
        let miss_distance_km = parse_float(record, columns::MISS_DISTANCE_KM)?;
        let raw_date = required(record, columns::APPROACH_DATE)?.trim();
        let date = if raw_date.is_empty() {
            None
        } else {
            Some(parse_date(columns::APPROACH_DATE, raw_date)?)
        };
        Ok(Self {
            entry_name,
            miss_distance_km,
            date,
        })
    }
}

fn required<'a>(record: &'a RawRecord, column: &str) -> Result<&'a str> {
    record
        .get(column)
        .map(String::as_str)
        .ok_or_else(|| CatalogError::missing(column))
}

fn parse_float(record: &RawRecord, column: &str) -> Result<f64> {
    let raw = required(record, column)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CatalogError::invalid(column, raw))
}

/// Parse a boolean flag. Accepts `true`/`false` in any case, `1`/`0`, and
/// `yes`/`no`.
pub fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(CatalogError::invalid(field, raw)),
    }
}

/// Validate a `YYYY-MM-DD` date and return it in canonical zero-padded form.
///
/// Canonical form matters: the date index relies on lexicographic order
/// matching chronological order.
pub fn parse_date(field: &str, raw: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .map_err(|_| CatalogError::invalid(field, raw))
}

#[cfg(test)]
pub(crate) fn record(pairs: &[(&str, &str)]) -> RawRecord {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
