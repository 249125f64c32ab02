//! # NEO search CLI (`neo`)
//!
//! Query a near-Earth object close-approach catalog by date, with filters.
//!
//! ## Usage
//!
//! ```bash
//! neo --config ./config/neo.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `neo query` | Search the catalog by exact date or date range |
//! | `neo stats` | Load the catalog and print a summary |
//! | `neo get <name>` | Show one object and all its close approaches |
//! | `neo completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Objects approaching on one day
//! neo query --date 2020-01-01
//!
//! # Large hazardous objects in January, as approach events
//! neo query --start-date 2020-01-01 --end-date 2020-01-31 \
//!     --filter diameter:>=:1.0 --filter is_hazardous:=:true --return-object Path
//!
//! # Write results to the configured CSV file
//! neo query --date 2020-01-01 --output csv_file
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neo_search::config;
use neo_search::get;
use neo_search::output::OutputFormat;
use neo_search::progress::ProgressMode;
use neo_search::search::{self, QueryArgs};
use neo_search::stats;

const DEFAULT_CONFIG: &str = "./config/neo.toml";

/// NEO search: query a near-Earth object close-approach catalog.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, `./config/neo.toml` is used if present, otherwise
/// built-in defaults.
#[derive(Parser)]
#[command(
    name = "neo",
    about = "Query a near-Earth object close-approach catalog by date, with filters",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults to `./config/neo.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog.
    ///
    /// Give either `--date`, or both `--start-date` and `--end-date`.
    /// `--date` wins when both are present. Filters are
    /// `field:operator:value` with fields `diameter`, `distance`,
    /// `is_hazardous` and operators `=`, `>`, `>=`.
    Query {
        /// Exact approach date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,

        /// Range start, inclusive (YYYY-MM-DD).
        #[arg(long)]
        start_date: Option<String>,

        /// Range end, inclusive (YYYY-MM-DD).
        #[arg(long)]
        end_date: Option<String>,

        /// Maximum number of results (default from config).
        #[arg(long, short = 'n')]
        number: Option<usize>,

        /// Filter as `field:operator:value`. Repeatable.
        #[arg(long = "filter", short = 'f')]
        filter: Vec<String>,

        /// `NEO` for objects, `Path` for approach events (default from config).
        #[arg(long)]
        return_object: Option<String>,

        /// Output format (default from config).
        #[arg(long, value_enum)]
        output: Option<OutputFormat>,

        /// Load progress on stderr (default: human when stderr is a TTY).
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Load the catalog and print summary statistics.
    Stats {
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Show one object and all of its close approaches.
    Get {
        /// Object name, matched exactly.
        name: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "neo", &mut std::io::stdout());
        return Ok(());
    }

    let (config_path, is_default) = match &cli.config {
        Some(path) => (path.clone(), false),
        None => (PathBuf::from(DEFAULT_CONFIG), true),
    };
    let cfg = config::load_config_or_default(&config_path, is_default)?;

    match cli.command {
        Commands::Query {
            date,
            start_date,
            end_date,
            number,
            filter,
            return_object,
            output,
            progress,
        } => {
            let args = QueryArgs {
                date,
                start_date,
                end_date,
                number,
                filter,
                return_object,
                output,
            };
            let reporter = progress.unwrap_or_else(ProgressMode::default_for_tty).reporter();
            search::run_query(&cfg, &args, reporter.as_ref())?;
        }
        Commands::Stats { progress } => {
            let reporter = progress.unwrap_or_else(ProgressMode::default_for_tty).reporter();
            stats::run_stats(&cfg, reporter.as_ref())?;
        }
        Commands::Get { name } => {
            get::run_get(&cfg, &name, ProgressMode::Off.reporter().as_ref())?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
