//! # neo-search
//!
//! Load a near-Earth object close-approach catalog and query it by date,
//! with filters on diameter, hazard flag, and miss distance.
//!
//! The indexing and search pipeline lives in [`neo_search_core`]; this
//! crate supplies the file reader, configuration, result writers, and the
//! `neo` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ CSV file   │──▶│ CatalogIndex │──▶│ SearchEngine │──▶ display / csv / json
//! └────────────┘   └──────────────┘   └──────▲───────┘
//!                                            │
//!                         CLI args ──▶ QueryPlan
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! neo query --date 2020-01-01
//! neo query --start-date 2020-01-01 --end-date 2020-01-31 \
//!     --filter diameter:>:0.5 --filter is_hazardous:=:true
//! neo query --date 2020-01-01 --return-object Path --output json
//! neo stats
//! neo get "433 Eros"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`ingest`] | Delimited catalog reader and loader |
//! | [`progress`] | Load progress on stderr |
//! | [`search`] | `neo query` |
//! | [`output`] | Display, CSV file, and JSON writers |
//! | [`stats`] | `neo stats` |
//! | [`get`] | `neo get` |

pub mod config;
pub mod get;
pub mod ingest;
pub mod output;
pub mod progress;
pub mod search;
pub mod stats;
