//! Gewinn-Crawler main entry point
//!
//! This is the command-line interface for the sweepstakes listing crawler.

use anyhow::Context;
use clap::Parser;
use gewinn_crawler::config::{load_config_with_hash, Config};
use gewinn_crawler::crawler::run_crawl;
use gewinn_crawler::output::{load_statistics, print_run_summary, print_statistics};
use gewinn_crawler::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gewinn-Crawler: harvests sweepstakes postings from listing portals
///
/// Walks each configured site's listing pages through their pagination,
/// extracts deadline and participation link of every posting, resolves the
/// link to its external destination and reconciles the result into SQLite.
#[derive(Parser, Debug)]
#[command(name = "gewinn-crawler")]
#[command(version)]
#[command(about = "A sweepstakes listing crawler", long_about = None)]
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

    /// Only crawl the named site (repeatable)
    #[arg(long = "site", value_name = "NAME")]
    sites: Vec<String>,

    /// Validate config and show what would be crawled without any network access
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show posting statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::debug!("Configuration hash: {}", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.sites)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &config_hash, &cli.sites).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gewinn_crawler=info,warn"),
            1 => EnvFilter::new("gewinn_crawler=debug,info"),
            2 => EnvFilter::new("gewinn_crawler=trace,debug"),
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

/// Handles the --dry-run mode: validates config and lists what would be crawled
fn handle_dry_run(config: &Config, sites: &[String]) -> anyhow::Result<()> {
    let profiles = config.select_profiles(sites)?;

    println!("=== Gewinn-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Delay after request: {}ms", config.crawler.request_delay_ms);
    println!(
        "  Timeouts: connect {}s, total {}s",
        config.crawler.connect_timeout_secs, config.crawler.request_timeout_secs
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSites ({}):", profiles.len());
    for profile in &profiles {
        println!("  - {} ({})", profile.name, profile.host);
        for entry in &profile.entry_points {
            println!("    * {}", entry);
        }
        if let Some(pattern) = &profile.listing_pattern {
            println!("    listing pattern: {}", pattern);
        }
        println!("    expiry time: {:?}", profile.expiry_time);
        println!(
            "    rules: {} entry, {} detail, {} next-page, {} date, {} action",
            profile.entry_links.len(),
            profile.detail_links.len(),
            profile.next_page.len(),
            profile.dates.len(),
            profile.action_links.len()
        );
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling from {} entry point(s)",
        profiles.iter().map(|p| p.entry_points.len()).sum::<usize>()
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("failed to open posting database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, sites: &[String]) -> anyhow::Result<()> {
    match run_crawl(config, config_hash, sites).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
