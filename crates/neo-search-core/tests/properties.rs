//! Property-based tests for index and search invariants.
//!
//! Records are drawn from small name and date pools so that names repeat,
//! dates collide, and range searches overlap.

use std::collections::HashSet;

use neo_search_core::{
    CatalogIndex, FilterPredicate, LoadPolicy, QueryParams, QueryPlan, RawRecord, SearchEngine,
    SearchResults,
};
use proptest::prelude::*;

const DATES: [&str; 5] = [
    "2020-01-01",
    "2020-01-02",
    "2020-01-03",
    "2020-02-01",
    "2021-01-01",
];

fn arb_record() -> impl Strategy<Value = RawRecord> {
    (
        prop::sample::select(vec!["A", "B", "C", "D", "E", "F"]),
        prop::sample::select(DATES.to_vec()),
        0.0f64..1000.0,
        0.0f64..5.0,
        any::<bool>(),
    )
        .prop_map(|(name, date, distance, diameter, hazardous)| {
            [
                ("id", format!("id-{}", name)),
                ("name", name.to_string()),
                ("estimated_diameter_min_kilometers", diameter.to_string()),
                (
                    "is_potentially_hazardous_asteroid",
                    if hazardous { "True" } else { "False" }.to_string(),
                ),
                ("miss_distance_kilometers", distance.to_string()),
                ("close_approach_date", date.to_string()),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<RawRecord>()
        })
}

fn arb_filter() -> impl Strategy<Value = String> {
    prop_oneof![
        (prop::sample::select(vec!["=", ">", ">="]), 0.0f64..5.0)
            .prop_map(|(op, v)| format!("diameter:{}:{}", op, v)),
        (prop::sample::select(vec!["=", ">", ">="]), 0.0f64..1000.0)
            .prop_map(|(op, v)| format!("distance:{}:{}", op, v)),
        any::<bool>().prop_map(|b| format!("is_hazardous:=:{}", b)),
    ]
}

fn build(records: &[RawRecord]) -> CatalogIndex {
    CatalogIndex::build(records.to_vec(), LoadPolicy::Abort)
        .unwrap()
        .0
}

fn between_plan(start: &str, end: &str, number: usize, filter: Vec<String>, shape: &str) -> QueryPlan {
    QueryPlan::build(&QueryParams {
        start_date: Some(start.to_string()),
        end_date: Some(end.to_string()),
        number,
        filter,
        return_object: shape.to_string(),
        ..Default::default()
    })
    .unwrap()
}

proptest! {
    #[test]
    fn distinct_names_match_input(records in prop::collection::vec(arb_record(), 0..40)) {
        let index = build(&records);
        let distinct: HashSet<&str> = records.iter().map(|r| r["name"].as_str()).collect();
        prop_assert_eq!(index.len(), distinct.len());
        prop_assert_eq!(index.event_count(), records.len());
    }

    #[test]
    fn every_event_reachable_by_date(records in prop::collection::vec(arb_record(), 0..40)) {
        let index = build(&records);
        for entry in index.entries() {
            for event in &entry.events {
                let date = event.date.as_deref().unwrap();
                let on_date = index.entries_on(date);
                prop_assert!(on_date.iter().any(|e| e.name == entry.name));
            }
        }
        for (date, entries) in index.dates() {
            let unique: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            prop_assert_eq!(unique.len(), entries.len());
            for entry in entries {
                prop_assert!(entry.events.iter().any(|e| e.date.as_deref() == Some(date)));
            }
        }
    }

    #[test]
    fn filters_narrow_and_are_idempotent(
        records in prop::collection::vec(arb_record(), 0..40),
        token in arb_filter(),
    ) {
        let index = build(&records);
        let predicate = FilterPredicate::parse(&token).unwrap();

        let entries: Vec<_> = index.entries().collect();
        let once = predicate.apply_many(entries.clone());
        prop_assert!(once.len() <= entries.len());
        prop_assert_eq!(predicate.apply_many(once.clone()), once);

        let events: Vec<_> = index.entries().flat_map(|e| e.events.iter()).collect();
        let once = predicate.apply_many(events.clone());
        prop_assert!(once.len() <= events.len());
        prop_assert_eq!(predicate.apply_many(once.clone()), once);
    }

    #[test]
    fn cap_is_respected(
        records in prop::collection::vec(arb_record(), 0..40),
        number in 1usize..10,
        shape in prop::sample::select(vec!["NEO", "Path"]),
    ) {
        let index = build(&records);
        let engine = SearchEngine::new(&index);
        let uncapped = engine
            .execute(&between_plan("2020-01-01", "2021-12-31", usize::MAX, vec![], shape))
            .unwrap();
        let capped = engine
            .execute(&between_plan("2020-01-01", "2021-12-31", number, vec![], shape))
            .unwrap();
        prop_assert!(capped.len() <= number);
        prop_assert_eq!(capped.len(), number.min(uncapped.len()));
    }

    #[test]
    fn adding_a_filter_never_grows_results(
        records in prop::collection::vec(arb_record(), 0..40),
        tokens in prop::collection::vec(arb_filter(), 0..3),
        extra in arb_filter(),
    ) {
        let index = build(&records);
        let engine = SearchEngine::new(&index);
        let base = engine
            .execute(&between_plan("2020-01-01", "2020-02-01", usize::MAX, tokens.clone(), "NEO"))
            .unwrap();
        let mut narrowed_tokens = tokens;
        narrowed_tokens.push(extra);
        let narrowed = engine
            .execute(&between_plan("2020-01-01", "2020-02-01", usize::MAX, narrowed_tokens, "NEO"))
            .unwrap();
        prop_assert!(narrowed.len() <= base.len());
    }

    #[test]
    fn results_are_unique(
        records in prop::collection::vec(arb_record(), 0..40),
        tokens in prop::collection::vec(arb_filter(), 0..3),
    ) {
        let index = build(&records);
        let results = SearchEngine::new(&index)
            .execute(&between_plan("2020-01-01", "2021-01-01", usize::MAX, tokens, "NEO"))
            .unwrap();
        let SearchResults::Entries(entries) = results else {
            panic!("expected entries");
        };
        let names: HashSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        prop_assert_eq!(names.len(), entries.len());
    }
}
