//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use arquivo_dl::DEFAULT_MAX_ATTEMPTS;
use arquivo_dl::download::BASE_URL;
use arquivo_dl::store::DEFAULT_STRUCTURE_FILE;

/// Scrape and batch-download the Arquivo Pessoa poetry archive.
///
/// `scrape` captures the category index, persists it as a JSON catalog and
/// downloads every poem; `resume` loads the persisted catalog and downloads
/// only the poems missing from the output directory.
#[derive(Parser, Debug)]
#[command(name = "arquivo-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the index, persist the catalog, and download every poem
    Scrape(RunOptions),
    /// Load the persisted catalog and download only the missing poems
    Resume(RunOptions),
}

/// Options shared by both download flows.
#[derive(clap::Args, Debug)]
pub struct RunOptions {
    /// Origin base URL hosting the archive
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// Directory where poem PDFs are stored
    #[arg(short = 'o', long, default_value = "arquivos_pessoa")]
    pub output_dir: PathBuf,

    /// Path of the persisted catalog file
    #[arg(short = 's', long, default_value = DEFAULT_STRUCTURE_FILE)]
    pub structure_file: PathBuf,

    /// Minimum pause between downloads in milliseconds (max 60000)
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub min_delay_ms: u64,

    /// Maximum pause between downloads in milliseconds (max 60000)
    #[arg(long, default_value_t = 2300, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub max_delay_ms: u64,

    /// Maximum fetch attempts per poem, including the first (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub max_attempts: u32,
}
