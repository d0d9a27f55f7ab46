//! Arquivo Pessoa archive downloader library.
//!
//! This library scrapes the Arquivo Pessoa category index into a tree of
//! categories and poems, persists that tree as a resumable JSON catalog, and
//! downloads each poem's PDF sequentially with retry and randomized pacing.
//!
//! # Architecture
//!
//! - [`catalog`] - The catalog tree model and its JSON codec
//! - [`missing`] - Diffing a catalog against the file store
//! - [`progress`] - Run progress counter with observer hooks
//! - [`download`] - HTTP fetcher, retry policy, and the download orchestrator
//! - [`scrape`] - Index page fetch and HTML-to-tree parsing
//!
//! Resumption is filesystem-driven: a poem counts as downloaded exactly when
//! a file exists at its derived path under the output directory. Re-running
//! the resolver against an unchanged store is idempotent.

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod missing;
pub mod progress;
pub mod scrape;

// Re-export commonly used types
pub use catalog::store::{self, StructureError};
pub use catalog::{Catalog, Category, Poem};
pub use download::{
    DEFAULT_MAX_ATTEMPTS, DownloadEngine, DownloadError, HttpClient, Pacing, PacingError,
    PoemFetcher, RetryPolicy, RunStats,
};
pub use missing::{count_missing, reduce_categories, reduce_category};
pub use progress::ProgressTracker;
pub use scrape::{ScrapeError, extract_catalog};
