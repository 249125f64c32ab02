//! `neo query`: plan, load, search, write.
//!
//! The query plan is built from the command-line arguments (with config
//! defaults) *before* the catalog is touched, so a bad date or an unknown
//! filter field fails fast without reading the data file.

use anyhow::{Context, Result};
use neo_search_core::{QueryParams, QueryPlan, SearchEngine};

use crate::config::Config;
use crate::ingest::load_catalog;
use crate::output::{write_results, OutputFormat};
use crate::progress::LoadProgressReporter;

/// Query arguments as given on the command line. `None` means "use the
/// config default".
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub number: Option<usize>,
    pub filter: Vec<String>,
    pub return_object: Option<String>,
    pub output: Option<OutputFormat>,
}

impl QueryArgs {
    /// Fill unset arguments from `config` to produce raw query parameters.
    pub fn to_params(&self, config: &Config) -> QueryParams {
        QueryParams {
            date: self.date.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            number: self.number.unwrap_or(config.query.default_number),
            filter: self.filter.clone(),
            return_object: self
                .return_object
                .clone()
                .unwrap_or_else(|| config.query.default_return_object.clone()),
        }
    }
}

pub fn run_query(
    config: &Config,
    args: &QueryArgs,
    progress: &dyn LoadProgressReporter,
) -> Result<()> {
    let params = args.to_params(config);
    let plan = QueryPlan::build(&params).context("Invalid query")?;

    let (index, _report) = load_catalog(&config.data.path, config.ingest.on_error, progress)?;

    let results = SearchEngine::new(&index)
        .execute(&plan)
        .context("Search failed")?;

    let format = args.output.unwrap_or(config.output.format);
    write_results(&results, &index, format, &config.output)
}
