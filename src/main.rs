//! Pokédex Harvest main entry point
//!
//! This is the command-line interface for the Pokédex Harvest table scraper.

use anyhow::Context;
use clap::Parser;
use pokedex_harvest::config::{load_config_with_hash, validate, Config};
use pokedex_harvest::crawler::crawl;
use pokedex_harvest::output::{analyze_csv, log_report, print_summary, write_records};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pokédex Harvest: a table scraper for a Pokémon reference site
///
/// Starting from a seed page, Pokédex Harvest discovers every content page,
/// extracts one record per entity table and exports the records to CSV.
#[derive(Parser, Debug)]
#[command(name = "pokedex-harvest")]
#[command(version)]
#[command(about = "Crawl a Pokémon reference site into a CSV file", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed page URL, overriding the configuration
    #[arg(long, env = "START_PAGE")]
    seed: Option<String>,

    /// CSV output path, overriding the configuration
    #[arg(short, long, env = "OUTPUT_FILE")]
    output: Option<PathBuf>,

    /// Skip the consistency report after export
    #[arg(long)]
    no_report: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pokedex_harvest=info,warn"),
            1 => EnvFilter::new("pokedex_harvest=debug,info"),
            2 => EnvFilter::new("pokedex_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies CLI overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }

    if cli.no_report {
        config.output.report = false;
    }

    validate(&config).context("invalid configuration")?;

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Pokédex Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Include seed page: {}", config.crawler.include_seed);
    println!("  Fallback charset: {}", config.crawler.fallback_charset);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nContent Pages:");
    println!("  Path prefix: {}", config.content.path_prefix);
    println!("  Extension: {}", config.content.extension);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!("  Consistency report: {}", config.output.report);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl, export and report
///
/// With `quiet` set nothing is printed to stdout; logging still reports errors.
async fn handle_crawl(config: &Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!("Starting crawl from {}", config.crawler.seed_url);

    let report = match crawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if !quiet {
        print_summary(&report);
    }

    if report.records.is_empty() {
        tracing::warn!("No records captured, skipping export");
        return Ok(());
    }

    let csv_path = Path::new(&config.output.csv_path);
    let written = write_records(&report.records, csv_path);
    if !quiet {
        println!("\n{} records exported to '{}'.", written, csv_path.display());
    }

    if config.output.report && written > 0 {
        match analyze_csv(csv_path) {
            Ok(consistency) => log_report(csv_path, &consistency),
            Err(e) => tracing::warn!("Consistency report unavailable: {}", e),
        }
    }

    Ok(())
}
