//! TOML configuration for the `neo` CLI.
//!
//! Every field has a default, so an empty file (or no file at all, via
//! [`Config::minimal`]) is a valid configuration.

use anyhow::{Context, Result};
use neo_search_core::{LoadPolicy, ResultShape};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/neo_data.csv")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IngestConfig {
    #[serde(default)]
    pub on_error: LoadPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_number")]
    pub default_number: usize,
    #[serde(default = "default_return_object")]
    pub default_return_object: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_number: default_number(),
            default_return_object: default_return_object(),
        }
    }
}

fn default_number() -> usize {
    10
}
fn default_return_object() -> String {
    "NEO".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            csv_path: default_csv_path(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data/neo_data_results.csv")
}

impl Config {
    /// Built-in defaults, used when no config file exists at the default path.
    pub fn minimal() -> Self {
        Self::default()
    }

    fn validate(&self) -> Result<()> {
        if self.query.default_number < 1 {
            anyhow::bail!("query.default_number must be >= 1");
        }

        ResultShape::parse(self.query.default_return_object.trim()).with_context(|| {
            format!(
                "query.default_return_object '{}' is not recognized",
                self.query.default_return_object
            )
        })?;

        if self.output.csv_path.as_os_str().is_empty() {
            anyhow::bail!("output.csv_path must not be empty");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}

/// Load `path`, or fall back to [`Config::minimal`] when `path` is the
/// default location and nothing is there.
pub fn load_config_or_default(path: &Path, is_default_path: bool) -> Result<Config> {
    if is_default_path && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::minimal());
    }
    load_config(path)
}
