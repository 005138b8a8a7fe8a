//! hh-harvest main entry point
//!
//! This is the command-line interface for the hh-harvest vacancy crawler.

use anyhow::Context;
use clap::Parser;
use hh_harvest::config::{load_config_with_hash, validate, Config};
use hh_harvest::crawler::crawl;
use hh_harvest::output::{open_sink, print_statistics};
use hh_harvest::WindowPartitioner;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// hh-harvest: crawl hh.ru vacancies region by region
///
/// Walks each region's postings backward through time in date windows,
/// narrowing windows that match more postings than the API pages through,
/// and writes every posting's full record to the configured output.
#[derive(Parser, Debug)]
#[command(name = "hh-harvest")]
#[command(version)]
#[command(about = "Date-window crawler for the hh.ru vacancies API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl only these regions instead of the configured list
    #[arg(long = "region", value_name = "ID")]
    regions: Vec<u32>,

    /// Write output here instead of the configured path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if !cli.regions.is_empty() {
        config.crawler.regions = cli.regions.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    validate(&config).context("invalid command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hh_harvest=info,warn"),
            1 => EnvFilter::new("hh_harvest=debug,info"),
            2 => EnvFilter::new("hh_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;
    let today = crawler
        .anchor_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let first_window = WindowPartitioner::from_config(crawler).initial(today);

    println!("=== hh-harvest Dry Run ===\n");

    println!("Traversal:");
    println!("  First window: {}", first_window);
    println!("  Earliest year: {}", crawler.earliest_year);
    println!("  Split threshold: {}", crawler.split_threshold);
    println!("  Window width: {} days", crawler.window_days);
    println!(
        "  Pages per window: {} x {} postings",
        crawler.max_pages, crawler.per_page
    );
    println!(
        "  Concurrency: {} regions, {} detail workers",
        crawler.max_concurrent_regions, crawler.detail_workers
    );

    println!("\nAPI:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  User agent: {}", config.api.user_agent);
    println!(
        "  Minimum delay between requests: {}ms",
        config.api.minimum_request_delay
    );

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Path: {}", config.output.path);

    println!("\nRegions ({}):", crawler.regions.len());
    for chunk in crawler.regions.chunks(12) {
        let line: Vec<String> = chunk.iter().map(u32::to_string).collect();
        println!("  {}", line.join(", "));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    let sink = open_sink(&config.output, config_hash)
        .with_context(|| format!("failed to open output {}", config.output.path))?;

    let (stop, shutdown) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received, finishing in-flight requests (press Ctrl-C again to quit)");
        let _ = stop.send(true);

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt received, exiting immediately");
            std::process::exit(130);
        }
    });

    match crawl(config, sink, shutdown).await {
        Ok(stats) => {
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
