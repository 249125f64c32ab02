//! Catalog entry lookup by name.
//!
//! Used by `neo get <name>` to show one object and every close approach
//! recorded for it.

use anyhow::{bail, Result};
use neo_search_core::{CatalogEntry, CatalogIndex};

use crate::config::Config;
use crate::ingest::load_catalog;
use crate::output::display_event;
use crate::progress::LoadProgressReporter;

/// Look up `name` in `index`. Names are matched exactly.
pub fn get_entry<'a>(index: &'a CatalogIndex, name: &str) -> Result<&'a CatalogEntry> {
    match index.get(name) {
        Some(entry) => Ok(entry),
        None => bail!("object not found: {}", name),
    }
}

pub fn run_get(config: &Config, name: &str, progress: &dyn LoadProgressReporter) -> Result<()> {
    let (index, _report) = load_catalog(&config.data.path, config.ingest.on_error, progress)?;
    let entry = get_entry(&index, name)?;
    print!("{}", render_entry(entry));
    Ok(())
}

fn render_entry(entry: &CatalogEntry) -> String {
    let mut out = String::new();
    out.push_str("--- NEO ---\n");
    out.push_str(&format!("id:               {}\n", entry.id));
    out.push_str(&format!("name:             {}\n", entry.name));
    out.push_str(&format!("diameter_min_km:  {}\n", entry.diameter_min_km));
    out.push_str(&format!("hazardous:        {}\n", entry.is_hazardous));
    out.push_str(&format!("approaches:       {}\n", entry.events.len()));
    for event in &entry.events {
        out.push_str(&format!("  {}\n", display_event(event)));
    }
    out
}
