//! # neo-search core
//!
//! Catalog models, the name/date index, filter predicates, query planning,
//! and the search pipeline for near-Earth object close-approach data.
//!
//! This crate does no file or console I/O. It consumes already-split
//! records ([`models::RawRecord`]) and returns borrowed results; reading
//! catalog files and writing output live in the application crate.
//!
//! ```text
//! records ──▶ CatalogIndex ──┐
//!                            ├──▶ SearchEngine ──▶ SearchResults
//! QueryParams ──▶ QueryPlan ─┘
//! ```

pub mod error;
pub mod filter;
pub mod index;
pub mod models;
pub mod query;
pub mod search;

pub use error::{CatalogError, RecordError, Result};
pub use filter::{FilterField, FilterOp, FilterPredicate, FilterTarget, FilterValue, Filterable};
pub use index::{CatalogIndex, IndexBuilder, IndexStats, LoadPolicy, LoadReport};
pub use models::{ApproachEvent, CatalogEntry, RawRecord};
pub use query::{DateSearch, QueryParams, QueryPlan, ResultShape};
pub use search::{SearchEngine, SearchResults};
