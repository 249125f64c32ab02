//! Search engine: execute a [`QueryPlan`] against a [`CatalogIndex`].
//!
//! # Pipeline
//!
//! 1. **Date selection.** Collect entries indexed on the exact date, or on
//!    every date in `[start, end]`. Entries may repeat across dates.
//! 2. **Non-distance filters.** Apply each entry filter in plan order.
//! 3. **Expansion.** Flatten the surviving entries into *all* of their
//!    approach events, not only the ones on the searched dates.
//! 4. **Distance filters.** Applied last, to the expanded events.
//! 5. **Contraction.** Resolve each surviving event back to its entry by
//!    name.
//! 6. **Deduplication.** Entries by name, events by identity. First-seen
//!    order is kept.
//! 7. **Shape and cap.** Return entries or events, truncated to `number`.
//!
//! The engine only reads the index, so any number of searches may share one.

use std::collections::HashSet;
use std::hash::Hash;

use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::models::{ApproachEvent, CatalogEntry};
use crate::query::{DateSearch, QueryPlan, ResultShape};

/// Search output, tagged by the shape the plan asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResults<'a> {
    Entries(Vec<&'a CatalogEntry>),
    Events(Vec<&'a ApproachEvent>),
}

impl SearchResults<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Entries(entries) => entries.len(),
            Self::Events(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            Self::Entries(_) => ResultShape::Entry,
            Self::Events(_) => ResultShape::Event,
        }
    }
}

/// Executes query plans against one index.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    index: &'a CatalogIndex,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a CatalogIndex) -> Self {
        Self { index }
    }

    /// Run `plan` and return up to `plan.number()` results.
    ///
    /// An empty date range is not an error; it yields an empty result.
    pub fn execute(&self, plan: &QueryPlan) -> Result<SearchResults<'a>> {
        let mut entries = self.select_by_date(plan.date_search());
        tracing::debug!(candidates = entries.len(), "date selection");

        for filter in plan.non_distance_filters() {
            entries = filter.apply_many(entries);
        }
        tracing::debug!(entries = entries.len(), "entry filters applied");

        let mut events: Vec<&'a ApproachEvent> = entries
            .iter()
            .copied()
            .flat_map(|entry| entry.events.iter())
            .collect();

        for filter in plan.distance_filters() {
            events = filter.apply_many(events);
        }
        tracing::debug!(events = events.len(), "distance filters applied");

        let entries = self.contract(&events)?;

        let results = match plan.shape() {
            ResultShape::Entry => {
                let mut unique = dedup_by_key(entries, |e| e.name.clone());
                unique.truncate(plan.number());
                SearchResults::Entries(unique)
            }
            ResultShape::Event => {
                let mut unique = dedup_by_key(events, |e| *e as *const ApproachEvent);
                unique.truncate(plan.number());
                SearchResults::Events(unique)
            }
        };
        tracing::debug!(
            results = results.len(),
            shape = results.shape().name(),
            "search complete"
        );
        Ok(results)
    }

    fn select_by_date(&self, date_search: &DateSearch) -> Vec<&'a CatalogEntry> {
        match date_search {
            DateSearch::Equals { date } => self.index.entries_on(date),
            DateSearch::Between { start, end } => self.index.entries_between(start, end),
        }
    }

    /// Map events back to their owning entries through the name index.
    fn contract(&self, events: &[&'a ApproachEvent]) -> Result<Vec<&'a CatalogEntry>> {
        events
            .iter()
            .map(|event| {
                self.index
                    .get(&event.entry_name)
                    .ok_or_else(|| CatalogError::InvariantViolation {
                        message: format!("event owner '{}' is not indexed", event.entry_name),
                    })
            })
            .collect()
    }
}

/// Drop repeats, keeping the first occurrence of each key.
fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LoadPolicy;
    use crate::models::{record, RawRecord};
    use crate::query::QueryParams;

    fn rec(name: &str, date: &str, distance: &str, diameter: &str, hazardous: &str) -> RawRecord {
        let id = format!("id-{}", name);
        record(&[
            ("id", id.as_str()),
            ("name", name),
            ("estimated_diameter_min_kilometers", diameter),
            ("is_potentially_hazardous_asteroid", hazardous),
            ("miss_distance_kilometers", distance),
            ("close_approach_date", date),
        ])
    }

    fn index() -> CatalogIndex {
        let (index, _) = CatalogIndex::build(
            vec![
                rec("A", "2020-01-01", "500", "0.5", "False"),
                rec("A", "2020-01-02", "50", "0.5", "False"),
                rec("B", "2020-01-01", "20", "2.0", "True"),
                rec("C", "2020-01-02", "900", "0.01", "False"),
                rec("D", "2020-01-03", "300", "1.5", "True"),
            ],
            LoadPolicy::Abort,
        )
        .unwrap();
        index
    }

    fn on(date: &str, number: usize, filter: &[&str], shape: &str) -> QueryPlan {
        QueryPlan::build(&QueryParams {
            date: Some(date.into()),
            number,
            filter: filter.iter().map(|s| s.to_string()).collect(),
            return_object: shape.into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn between(start: &str, end: &str, number: usize, filter: &[&str], shape: &str) -> QueryPlan {
        QueryPlan::build(&QueryParams {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            number,
            filter: filter.iter().map(|s| s.to_string()).collect(),
            return_object: shape.into(),
            ..Default::default()
        })
        .unwrap()
    }

    fn entry_names(results: &SearchResults<'_>) -> Vec<String> {
        match results {
            SearchResults::Entries(entries) => entries.iter().map(|e| e.name.clone()).collect(),
            SearchResults::Events(_) => panic!("expected entries"),
        }
    }

    fn event_keys(results: &SearchResults<'_>) -> Vec<(String, f64)> {
        match results {
            SearchResults::Events(events) => events
                .iter()
                .map(|e| (e.entry_name.clone(), e.miss_distance_km))
                .collect(),
            SearchResults::Entries(_) => panic!("expected events"),
        }
    }

    #[test]
    fn test_equals_no_filters() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-01", 10, &[], "NEO"))
            .unwrap();
        assert_eq!(entry_names(&results), vec!["A", "B"]);
    }

    #[test]
    fn test_between_dedups_entries() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&between("2020-01-01", "2020-01-03", 10, &[], "NEO"))
            .unwrap();
        assert_eq!(entry_names(&results), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_entry_filter_narrows() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&between(
                "2020-01-01",
                "2020-01-03",
                10,
                &["is_hazardous:=:true", "diameter:>:1.8"],
                "NEO",
            ))
            .unwrap();
        assert_eq!(entry_names(&results), vec!["B"]);
    }

    #[test]
    fn test_events_expand_beyond_searched_date() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-01", 10, &[], "Path"))
            .unwrap();
        assert_eq!(
            event_keys(&results),
            vec![
                ("A".to_string(), 500.0),
                ("A".to_string(), 50.0),
                ("B".to_string(), 20.0)
            ]
        );
    }

    #[test]
    fn test_distance_filter_applies_last() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-02", 10, &["distance:>:100"], "NEO"))
            .unwrap();
        // A survives through its 500 km event on another date.
        assert_eq!(entry_names(&results), vec!["A", "C"]);

        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-02", 10, &["distance:>:100"], "Path"))
            .unwrap();
        assert_eq!(
            event_keys(&results),
            vec![("A".to_string(), 500.0), ("C".to_string(), 900.0)]
        );
    }

    #[test]
    fn test_distance_filter_can_drop_entry() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-01", 10, &["distance:>=:100"], "NEO"))
            .unwrap();
        assert_eq!(entry_names(&results), vec!["A"]);
    }

    #[test]
    fn test_events_deduped_across_dates() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&between("2020-01-01", "2020-01-02", 10, &[], "Path"))
            .unwrap();
        // A is selected under both dates but each event is returned once.
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_cap_respected() {
        let index = index();
        for number in 1..=6 {
            let results = SearchEngine::new(&index)
                .execute(&between("2020-01-01", "2020-01-03", number, &[], "NEO"))
                .unwrap();
            assert_eq!(results.len(), number.min(4));
        }
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("1999-12-31", 5, &[], "NEO"))
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.shape(), ResultShape::Entry);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&between("2020-01-03", "2020-01-01", 5, &[], "Path"))
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.shape(), ResultShape::Event);
    }

    #[test]
    fn test_dedup_by_key_keeps_first() {
        let out = dedup_by_key(vec![3, 1, 3, 2, 1], |x| *x);
        assert_eq!(out, vec![3, 1, 2]);
    }

    #[test]
    fn test_results_serialize_as_array() {
        let index = index();
        let results = SearchEngine::new(&index)
            .execute(&on("2020-01-03", 5, &[], "NEO"))
            .unwrap();
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["name"], "D");
        assert_eq!(json[0]["events"][0]["date"], "2020-01-03");
    }
}
