//! Catalog index: entries by unique name and by approach date.
//!
//! The index owns every [`CatalogEntry`] in an arena. Two lookup
//! structures point into it:
//!
//! - `by_name` maps each name to its single entry.
//! - `by_date` maps each `YYYY-MM-DD` date to the entries with at least one
//!   event on that date. Keys are kept sorted so `between` searches are an
//!   ordered range scan. An entry is listed at most once per date.
//!
//! Both structures are filled in the same pass by [`IndexBuilder`], so every
//! dated event reachable by name is also reachable by date.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};
use crate::models::{ApproachEvent, CatalogEntry, RawRecord};

/// Position of an entry in the index arena.
pub type EntryId = usize;

/// What to do when a record fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Stop at the first bad record and return its error.
    #[default]
    Abort,
    /// Log and count the bad record, then continue.
    Skip,
}

/// Outcome of a load: how many records made it in, and which were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: Vec<RecordError>,
}

/// Read-only index over the loaded catalog.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, EntryId>,
    by_date: BTreeMap<String, Vec<EntryId>>,
}

/// Summary counts for an index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub events: usize,
    pub dates: usize,
    pub earliest_date: Option<String>,
    pub latest_date: Option<String>,
    pub hazardous_entries: usize,
}

impl CatalogIndex {
    /// Build an index from a sequence of records under the given policy.
    ///
    /// With [`LoadPolicy::Abort`] the first bad record is returned as an
    /// error and nothing is built. With [`LoadPolicy::Skip`] bad records are
    /// listed in the [`LoadReport`].
    pub fn build<I>(
        records: I,
        policy: LoadPolicy,
    ) -> std::result::Result<(Self, LoadReport), RecordError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut builder = IndexBuilder::new(policy);
        for record in records {
            builder.push(Ok(record))?;
        }
        Ok(builder.finish())
    }

    /// Look up an entry by its unique name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(name).map(|&id| &self.entries[id])
    }

    /// All entries, in the order their names were first seen.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Indexed dates in ascending order, each with its entries.
    pub fn dates(&self) -> impl Iterator<Item = (&str, Vec<&CatalogEntry>)> {
        self.by_date
            .iter()
            .map(|(date, ids)| (date.as_str(), self.resolve(ids)))
    }

    /// Entries with an event on exactly `date`.
    pub fn entries_on(&self, date: &str) -> Vec<&CatalogEntry> {
        self.by_date
            .get(date)
            .map(|ids| self.resolve(ids))
            .unwrap_or_default()
    }

    /// Entries indexed under every date in `[start, end]`, concatenated in
    /// date order. An entry with events on several dates in range appears
    /// once per date. A reversed range selects nothing.
    pub fn entries_between(&self, start: &str, end: &str) -> Vec<&CatalogEntry> {
        if start > end {
            return Vec::new();
        }
        self.by_date
            .range::<str, _>((Bound::Included(start), Bound::Included(end)))
            .flat_map(|(_, ids)| ids.iter().map(|&id| &self.entries[id]))
            .collect()
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total approach events across all entries.
    pub fn event_count(&self) -> usize {
        self.entries.iter().map(|e| e.events.len()).sum()
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            entries: self.len(),
            events: self.event_count(),
            dates: self.by_date.len(),
            earliest_date: self.by_date.keys().next().cloned(),
            latest_date: self.by_date.keys().next_back().cloned(),
            hazardous_entries: self.entries.iter().filter(|e| e.is_hazardous).count(),
        }
    }

    fn resolve(&self, ids: &[EntryId]) -> Vec<&CatalogEntry> {
        ids.iter().map(|&id| &self.entries[id]).collect()
    }

    /// Apply one record. Every field is parsed before anything is mutated,
    /// so a failing record leaves the index untouched.
    fn insert(&mut self, record: &RawRecord) -> Result<()> {
        let candidate = CatalogEntry::from_record(record)?;
        let event = ApproachEvent::from_record(record)?;

        let id = match self.by_name.get(&candidate.name) {
            Some(&id) => id,
            None => {
                let id = self.entries.len();
                self.by_name.insert(candidate.name.clone(), id);
                self.entries.push(candidate);
                id
            }
        };

        if let Some(date) = &event.date {
            let ids = self.by_date.entry(date.clone()).or_default();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        self.entries[id].add_event(event);
        Ok(())
    }
}

/// Incremental builder that applies a [`LoadPolicy`] record by record.
///
/// Accepts `Result` items so callers reading from a file can feed row-level
/// parse errors through the same policy as field errors.
#[derive(Debug)]
pub struct IndexBuilder {
    index: CatalogIndex,
    policy: LoadPolicy,
    report: LoadReport,
    position: usize,
}

impl IndexBuilder {
    pub fn new(policy: LoadPolicy) -> Self {
        Self {
            index: CatalogIndex::default(),
            policy,
            report: LoadReport::default(),
            position: 0,
        }
    }

    /// Apply the next record. Returns an error only under
    /// [`LoadPolicy::Abort`].
    pub fn push(&mut self, record: Result<RawRecord>) -> std::result::Result<(), RecordError> {
        self.position += 1;
        let outcome = record.and_then(|r| self.index.insert(&r));
        match outcome {
            Ok(()) => {
                self.report.loaded += 1;
                Ok(())
            }
            Err(source) => {
                let err = RecordError {
                    record: self.position,
                    source,
                };
                match self.policy {
                    LoadPolicy::Abort => Err(err),
                    LoadPolicy::Skip => {
                        tracing::warn!("skipping {}", err);
                        self.report.skipped.push(err);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Number of records pushed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn finish(self) -> (CatalogIndex, LoadReport) {
        tracing::debug!(
            entries = self.index.len(),
            loaded = self.report.loaded,
            skipped = self.report.skipped.len(),
            "catalog index built"
        );
        (self.index, self.report)
    }
}
