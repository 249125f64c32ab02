//! Query plan building: validate raw query parameters into a [`QueryPlan`].
//!
//! Building is pure. Every validation failure aborts the build, so no
//! partially valid plan ever reaches the search engine.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::filter::{FilterField, FilterPredicate, FilterTarget};
use crate::models::parse_date;

/// Raw query parameters as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QueryParams {
    /// Exact date. Takes precedence over `start_date`/`end_date`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Maximum number of results, must be at least 1.
    pub number: usize,
    /// `field:operator:value` tokens, applied in order.
    #[serde(default)]
    pub filter: Vec<String>,
    /// `NEO` or `Path`.
    pub return_object: String,
}

/// How the date index is searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DateSearch {
    Equals { date: String },
    Between { start: String, end: String },
}

/// Which entity type a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResultShape {
    /// Catalog entries (`NEO`).
    Entry,
    /// Approach events (`Path`).
    Event,
}

impl ResultShape {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "NEO" => Ok(Self::Entry),
            "Path" => Ok(Self::Event),
            other => Err(CatalogError::unsupported(format!(
                "return object '{}' (expected NEO or Path)",
                other
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Entry => "NEO",
            Self::Event => "Path",
        }
    }
}

/// A validated, executable search request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    date_search: DateSearch,
    filters: Vec<FilterPredicate>,
    number: usize,
    shape: ResultShape,
}

impl QueryPlan {
    /// Validate `params` into a plan.
    pub fn build(params: &QueryParams) -> Result<Self> {
        let shape = ResultShape::parse(params.return_object.trim())?;

        if params.number == 0 {
            return Err(CatalogError::invalid("number", "0"));
        }

        let date_search = build_date_search(params)?;

        let filters = params
            .filter
            .iter()
            .map(|token| FilterPredicate::parse(token))
            .collect::<Result<Vec<_>>>()?;

        let plan = Self {
            date_search,
            filters,
            number: params.number,
            shape,
        };
        tracing::debug!(
            date_search = ?plan.date_search,
            filters = plan.filters.len(),
            number = plan.number,
            shape = plan.shape.name(),
            "query plan built"
        );
        Ok(plan)
    }

    pub fn date_search(&self) -> &DateSearch {
        &self.date_search
    }

    /// All filters in input order.
    pub fn filters(&self) -> &[FilterPredicate] {
        &self.filters
    }

    /// Filters targeting one entity type, in input order.
    pub fn filters_for(&self, target: FilterTarget) -> impl Iterator<Item = &FilterPredicate> {
        self.filters.iter().filter(move |f| f.target() == target)
    }

    /// Filters on anything but miss distance, in input order.
    pub fn non_distance_filters(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.filters
            .iter()
            .filter(|f| f.field() != FilterField::Distance)
    }

    /// Miss-distance filters, in input order.
    pub fn distance_filters(&self) -> impl Iterator<Item = &FilterPredicate> {
        self.filters
            .iter()
            .filter(|f| f.field() == FilterField::Distance)
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn shape(&self) -> ResultShape {
        self.shape
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn build_date_search(params: &QueryParams) -> Result<DateSearch> {
    if let Some(date) = non_blank(&params.date) {
        return Ok(DateSearch::Equals {
            date: parse_date("date", date)?,
        });
    }

    let start = non_blank(&params.start_date);
    let end = non_blank(&params.end_date);
    match (start, end) {
        (Some(start), Some(end)) => {
            let start = parse_date("start_date", start)?;
            let end = parse_date("end_date", end)?;
            if start > end {
                tracing::warn!(
                    %start,
                    %end,
                    "start_date is after end_date; the search will return nothing"
                );
            }
            Ok(DateSearch::Between { start, end })
        }
        (None, None) => Err(CatalogError::missing("date")),
        (None, Some(_)) => Err(CatalogError::missing("start_date")),
        (Some(_), None) => Err(CatalogError::missing("end_date")),
    }
}
