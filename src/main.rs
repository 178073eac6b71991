//! Geo-Lens main entry point
//!
//! This is the command-line interface for the Geo-Lens GEO readiness
//! analyzer.

use clap::Parser;
use geo_lens::config::{load_config, validate_config, Config};
use geo_lens::model::{AnalysisStatus, ScraperType};
use geo_lens::pipeline::{Pipeline, SubmitRequest};
use geo_lens::storage::{Datastore, SqliteStorage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Geo-Lens: a GEO readiness analyzer
///
/// Geo-Lens checks how ready a website is for AI answer engines. It
/// scrapes the homepage and up to nine same-origin pages, scores each
/// one against a ten-factor rubric, and stores the results locally.
#[derive(Parser, Debug)]
#[command(name = "geo-lens")]
#[command(version = "1.0.0")]
#[command(about = "Analyze a website's readiness for AI answer engines", long_about = None)]
struct Cli {
    /// URL to analyze
    #[arg(value_name = "URL", required_unless_present_any = ["rankings", "results"])]
    url: Option<String>,

    /// Scrape backend to use: "headless" or "api"
    #[arg(long, value_name = "BACKEND")]
    scraper: Option<String>,

    /// API key for the "api" backend
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides the configured path)
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the domain rankings and exit
    #[arg(long, conflicts_with_all = ["url", "results"])]
    rankings: bool,

    /// Rankings page number
    #[arg(long, default_value_t = 1, requires = "rankings")]
    page: u32,

    /// Show the stored results of a previous analysis and exit
    #[arg(long, value_name = "ID", conflicts_with = "url")]
    results: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };
    if let Some(database) = &cli.database {
        config.output.database_path = database.clone();
    }
    validate_config(&config)?;

    if cli.rankings {
        handle_rankings(&config, cli.page)?;
    } else if let Some(analysis_id) = cli.results {
        handle_results(&config, analysis_id)?;
    } else if let Some(url) = cli.url.clone() {
        handle_analyze(config, url, cli.scraper, cli.api_key).await?;
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
            0 => EnvFilter::new("geo_lens=info,warn"),
            1 => EnvFilter::new("geo_lens=debug,info"),
            2 => EnvFilter::new("geo_lens=trace,debug"),
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

/// Handles the main analyze operation
async fn handle_analyze(
    config: Config,
    url: String,
    scraper: Option<String>,
    api_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scraper_type = match scraper.as_deref() {
        Some(raw) => Some(
            ScraperType::from_db_string(raw)
                .ok_or_else(|| format!("Unknown scraper backend: {}", raw))?,
        ),
        None => None,
    };

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let storage = Arc::new(Mutex::new(storage));
    let pipeline = Pipeline::new(Arc::clone(&storage), config);

    let request = SubmitRequest {
        url,
        scraper_type,
        credential: api_key.clone(),
        client_key: "cli".to_string(),
    };

    let analysis_id = pipeline.submit(&request).await?;
    let status = pipeline.run(analysis_id, api_key.as_deref()).await?;

    match status {
        AnalysisStatus::Completed => {
            print_report(&storage, analysis_id)?;
            Ok(())
        }
        _ => {
            let record = lock_storage(&storage, |s| s.get_analysis(analysis_id))?;
            let message = record
                .error_message
                .unwrap_or_else(|| "Analysis failed".to_string());
            Err(message.into())
        }
    }
}

/// Handles the --rankings mode: shows the stored domain leaderboard
fn handle_rankings(config: &Config, page: u32) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let rankings = storage.rankings(page)?;

    println!("=== Domain Rankings ===\n");
    if rankings.rows.is_empty() {
        println!("No completed analyses yet.");
        return Ok(());
    }

    println!("{:<5} {:<40} {:>5}  {}", "#", "Domain", "Score", "Analyzed");
    for (i, row) in rankings.rows.iter().enumerate() {
        let rank = (rankings.page - 1) * rankings.page_size + i as u32 + 1;
        println!(
            "{:<5} {:<40} {:>5}  {}",
            rank, row.domain, row.overall_score, row.created_at
        );
    }
    println!(
        "\nPage {} of {} ({} domains)",
        rankings.page, rankings.total_pages, rankings.total_items
    );

    Ok(())
}

/// Handles the --results mode: prints a stored analysis report
fn handle_results(config: &Config, analysis_id: i64) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let storage = Arc::new(Mutex::new(storage));
    print_report(&storage, analysis_id)
}

fn lock_storage<S, R>(
    storage: &Arc<Mutex<S>>,
    f: impl FnOnce(&mut S) -> R,
) -> R {
    let mut guard = storage.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
}

/// Prints the full per-page factor report for an analysis
fn print_report(
    storage: &Arc<Mutex<SqliteStorage>>,
    analysis_id: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = lock_storage(storage, |s| s.get_analysis(analysis_id))?;
    let pages = lock_storage(storage, |s| s.get_page_scores(analysis_id))?;

    println!("=== GEO Analysis: {} ===\n", record.domain);
    println!("URL:      {}", record.url);
    println!("Status:   {}", record.status);
    println!("Scraper:  {}", record.scraper_type);
    if let Some(score) = record.overall_score {
        println!("Overall:  {}/100", score);
    }
    if let Some(message) = &record.error_message {
        println!("Error:    {}", message);
    }

    for page in &pages {
        println!("\n{}  {}/100", page.url, page.score);
        for factor in page.breakdown.factors() {
            println!(
                "  {:<24} {:>2}/{:<3} {}",
                factor.label, factor.score, factor.max_score, factor.details
            );
        }
    }

    Ok(())
}
