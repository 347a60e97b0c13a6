//! lelnovo CLI - query and compare catalog snapshots from the terminal.
//!
//! The snapshot path comes from `--db`, `LELNOVO_DB`, or `catalog.path` in
//! the configuration file named by `--config` / `LELNOVO_CONFIG`.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lelnovo::storage::load_catalog;
use lelnovo::{diff, get_specs, report, search, Catalog, LelnovoConfig, Lookup};

/// Query and diff engine over laptop catalog snapshots.
#[derive(Debug, Parser)]
#[command(name = "lelnovo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog snapshot (JSON).
    #[arg(long, env = "LELNOVO_DB")]
    db: Option<PathBuf>,

    /// Configuration file (TOML).
    #[arg(long, env = "LELNOVO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every spec name that can be searched or looked up.
    Listspecs,
    /// Show catalog size and age.
    Status,
    /// Search parts, e.g. `search x1, cpu:i7, price<1500`.
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show a part's specs, optionally only the named ones.
    Specs {
        part_number: String,
        /// Comma-separated spec names; all specs when omitted.
        fields: Vec<String>,
    },
    /// Show changes recorded in the snapshot, or against an older one.
    Changes {
        #[arg(long)]
        against: Option<PathBuf>,
    },
    /// Check catalog invariants.
    Validate,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LelnovoConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => LelnovoConfig::default(),
    };
    let Some(db) = cli.db.clone().or_else(|| config.catalog.path.clone()) else {
        bail!("no catalog given. Use --db, LELNOVO_DB, or catalog.path in the config file");
    };
    let catalog = load_catalog(&db).with_context(|| format!("loading {}", db.display()))?;

    match cli.command {
        Commands::Listspecs => println!("{}", report::spec_keys(&catalog)),
        Commands::Status => {
            println!("{}", report::status_line(&catalog));
            println!("{}", report::footer(&catalog, Utc::now()));
        }
        Commands::Search { query } => run_search(&catalog, &config, &query.join(" "))?,
        Commands::Specs {
            part_number,
            fields,
        } => run_specs(&catalog, &config, &part_number, &fields)?,
        Commands::Changes { against } => {
            let changes = match against {
                Some(old_path) => {
                    let old = load_catalog(&old_path)
                        .with_context(|| format!("loading {}", old_path.display()))?;
                    diff(&catalog, &old)
                }
                None => catalog.changes.clone(),
            };
            println!("{}", report::changes(&changes, Utc::now()));
        }
        Commands::Validate => {
            catalog
                .validate()
                .with_context(|| format!("{} is not a valid catalog", db.display()))?;
            println!("ok: {}", report::status_line(&catalog));
        }
    }
    Ok(())
}

fn run_search(catalog: &Catalog, config: &LelnovoConfig, query: &str) -> Result<()> {
    let aliases = config.alias_table();
    let outcome = search(catalog, &aliases, config.search_options(), query);
    if let Err(e) = &outcome.result {
        for d in &outcome.dropped {
            println!("ignored '{}': {}", d.term, d.reason);
        }
        bail!("{e}: try `lelnovo listspecs` for valid spec names");
    }
    println!("{}", report::search_results(query, outcome.hits(), &outcome.dropped));
    Ok(())
}

fn run_specs(
    catalog: &Catalog,
    config: &LelnovoConfig,
    part_number: &str,
    fields: &[String],
) -> Result<()> {
    let requested: Vec<&str> = fields
        .iter()
        .flat_map(|f| f.split(','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    match get_specs(catalog, &config.alias_table(), part_number, &requested) {
        Lookup::Found { info, specs, .. } => {
            println!("{}", report::part_specs(catalog, &info, &specs));
            Ok(())
        }
        Lookup::NotFound { part_number } => bail!("part number {part_number} not found"),
    }
}
