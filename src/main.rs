//! CLI entry point for the Arquivo Pessoa downloader.

mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use arquivo_dl::catalog::Category;
use arquivo_dl::{
    Catalog, DownloadEngine, HttpClient, Pacing, ProgressTracker, RetryPolicy, RunStats,
    StructureError, extract_catalog, reduce_categories, store,
};

use cli::{Args, Command, RunOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);
    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Scrape(run) => run_scrape(run, args.quiet).await,
        Command::Resume(run) => run_resume(run, args.quiet).await,
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--quiet` forces errors only and
/// `-v`/`-vv` raise the level to debug/trace.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Scrape flow: fetch the index, persist the catalog, download everything.
async fn run_scrape(run: RunOptions, quiet: bool) -> Result<()> {
    let client = HttpClient::with_base_url(&run.base_url);

    info!(base_url = %run.base_url, "fetching category index");
    let html = client
        .fetch_page(client.base_url())
        .await
        .context("failed to fetch the category index page")?;

    let catalog = extract_catalog(&html)?;
    catalog
        .validate()
        .context("scraped catalog failed path validation")?;

    store::save(&catalog, &run.structure_file).context("failed to persist the catalog")?;
    info!(
        categories = catalog.total_categories,
        poems = catalog.total_poems,
        structure_file = %run.structure_file.display(),
        "catalog captured"
    );

    download(&client, &catalog.categories, catalog.total_poems as u64, &run, quiet).await
}

/// Resume flow: load the persisted catalog and download only what is missing.
async fn run_resume(run: RunOptions, quiet: bool) -> Result<()> {
    let catalog = load_catalog(&run.structure_file)?;

    let missing = reduce_categories(&catalog.categories, &run.output_dir);
    if missing.is_empty() {
        info!("nothing to download; every poem in the catalog is already present");
        println!("{}", ProgressTracker::new(0).summary());
        return Ok(());
    }

    let total: u64 = missing.iter().map(|c| c.count_poems() as u64).sum();
    info!(
        total,
        output_dir = %run.output_dir.display(),
        "missing poems to download"
    );

    let client = HttpClient::with_base_url(&run.base_url);
    download(&client, &missing, total, &run, quiet).await
}

fn load_catalog(structure_file: &Path) -> Result<Catalog> {
    match store::load(structure_file) {
        Ok(catalog) => Ok(catalog),
        Err(err @ StructureError::NotFound { .. }) => Err(anyhow::Error::new(err)
            .context("no catalog has been captured yet; run `arquivo-dl scrape` first")),
        Err(err) => Err(err.into()),
    }
}

/// Runs the download engine over `categories` and reports the summary.
async fn download(
    client: &HttpClient,
    categories: &[Category],
    total: u64,
    options: &RunOptions,
    quiet: bool,
) -> Result<()> {
    let pacing = Pacing::new(
        Duration::from_millis(options.min_delay_ms),
        Duration::from_millis(options.max_delay_ms),
    )?;
    let engine = DownloadEngine::new(RetryPolicy::with_max_attempts(options.max_attempts), pacing);

    let mut tracker = ProgressTracker::new(total);
    let bar = (!quiet).then(|| progress_bar(total));
    if let Some(bar) = bar.clone() {
        tracker.on_progress(move |current, _| bar.set_position(current));
    }

    let stats = engine
        .run(client, categories, &options.output_dir, &mut tracker)
        .await;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    report(&stats, &tracker);
    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Logs the run outcome and prints the summary line.
///
/// The summary goes to stdout directly, not through tracing, so it survives
/// `--quiet` and restrictive `RUST_LOG` filters.
fn report(stats: &RunStats, tracker: &ProgressTracker) {
    if stats.failed > 0 {
        warn!(
            downloaded = stats.downloaded,
            failed = stats.failed,
            "run finished with failures; re-run `arquivo-dl resume` to retry"
        );
    } else {
        info!(downloaded = stats.downloaded, "run finished");
    }
    println!("{}", tracker.summary());
}
