//! Civic-Calendar main entry point
//!
//! This is the command-line interface for the town meeting calendar harvester.

use chrono::Datelike;
use civic_calendar::config::{load_config_with_hash, Config};
use civic_calendar::crawler::{
    month_label, month_starts, spawn_crawl, Coordinator, CrawlProgress, CrawlRequest, LogProgress,
    ProgressSink,
};
use civic_calendar::site::month_url;
use civic_calendar::storage::{lock, open_storage, shared, MemoryStorage, Storage};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Civic-Calendar: a town meeting calendar harvester
///
/// Civic-Calendar walks the town website's monthly calendar pages, collects
/// the meetings listed there, enriches each from its detail page and stores
/// them without duplicates.
#[derive(Parser, Debug)]
#[command(name = "civic-calendar")]
#[command(version = "1.0.0")]
#[command(about = "A town meeting calendar harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// First day of the range, YYYY-MM-DD
    #[arg(long, value_name = "DATE", requires = "end")]
    start: Option<String>,

    /// Last day of the range (inclusive), YYYY-MM-DD
    #[arg(long, value_name = "DATE", requires = "start")]
    end: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl into a throwaway in-memory store instead of the database
    #[arg(long, conflicts_with_all = ["stats", "list", "clear"])]
    memory: bool,

    /// Validate config and show which listing pages would be fetched
    #[arg(long, conflicts_with_all = ["stats", "list", "clear"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list", "clear"])]
    stats: bool,

    /// Print stored entries (limited to --start/--end when given) and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "clear"])]
    list: bool,

    /// Remove every stored entry and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "list"])]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let request = match (&cli.start, &cli.end) {
        (Some(start), Some(end)) => Some(CrawlRequest::parse(start, end)?),
        _ => None,
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, request)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.list {
        handle_list(&config, request)?;
    } else if cli.clear {
        handle_clear(&config)?;
    } else {
        let request = request.ok_or("--start and --end are required to crawl")?;
        if cli.memory {
            handle_crawl(&config, MemoryStorage::new(), request).await?;
        } else {
            let storage = open_storage(Path::new(&config.output.database_path))?;
            handle_crawl(&config, storage, request).await?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("civic_calendar=info,warn"),
            1 => EnvFilter::new("civic_calendar=debug,info"),
            2 => EnvFilter::new("civic_calendar=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(
    config: &Config,
    request: Option<CrawlRequest>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Civic-Calendar Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Calendar path: {}", config.site.calendar_path);

    println!("\nFetcher:");
    println!("  Request timeout: {}s", config.fetcher.request_timeout);
    println!("  Max redirects: {}", config.fetcher.max_redirects);
    println!("  Polite delay: {}ms", config.fetcher.polite_delay);
    println!("  Max retries: {}", config.fetcher.max_retries);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");

    if let Some(request) = request {
        let months = month_starts(request.start, request.end);
        println!(
            "✓ Would crawl {} month(s) from {} to {}:",
            months.len(),
            request.start,
            request.end
        );
        for month in months {
            let url = month_url(&config.site, month.year(), month.month())?;
            println!("  - {}: {}", month_label(month), url);
        }
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use civic_calendar::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let storage = open_storage(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&storage)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list mode: prints stored entries
fn handle_list(
    config: &Config,
    request: Option<CrawlRequest>,
) -> Result<(), Box<dyn std::error::Error>> {
    use civic_calendar::output::{load_entries, print_entries};

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let range = request.map(|r| (r.start, r.end));
    let entries = load_entries(&storage, range)?;

    print_entries(&entries)?;

    Ok(())
}

/// Handles the --clear mode: removes all entries
fn handle_clear(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    let removed = storage.get_entry_count()?;
    storage.clear_all_entries()?;

    println!("✓ Removed {} entries from {}", removed, config.output.database_path);

    Ok(())
}

/// Handles the main crawl operation
///
/// The crawl runs on a detached task; this waits for it while relaying its
/// progress updates to the log.
async fn handle_crawl<S>(
    config: &Config,
    storage: S,
    request: CrawlRequest,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: Storage + Send + 'static,
{
    let storage = shared(storage);
    let coordinator = Arc::new(Coordinator::new(config, Arc::clone(&storage))?);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<CrawlProgress>();
    let handle = spawn_crawl(coordinator, request, Arc::new(tx));

    // The channel closes once the crawl task drops its sender
    while let Some(progress) = rx.recv().await {
        LogProgress.report(&progress);
    }

    let summary = handle.await?;
    let stored = lock(&storage)?.get_entry_count()?;

    println!(
        "✓ Crawled {} month(s), {} new entries ({} stored in total)",
        summary.months_visited, summary.total_entries, stored
    );
    if !summary.failed_months.is_empty() {
        println!("✗ Failed months: {}", summary.failed_months.join(", "));
    }

    Ok(())
}
