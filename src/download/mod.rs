//! Poem download plumbing: HTTP fetcher, retry policy, and the orchestrator.
//!
//! The orchestrator walks an (already reduced) category tree sequentially,
//! fetching one PDF at a time through the [`PoemFetcher`] seam, retrying
//! transient failures with exponential backoff, and pausing for a uniform
//! random delay between items so the origin is never hammered.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use arquivo_dl::{DownloadEngine, HttpClient, Pacing, ProgressTracker, RetryPolicy};
//!
//! # async fn example(categories: Vec<arquivo_dl::Category>) {
//! let client = HttpClient::new();
//! let pacing = Pacing::new(Duration::from_secs(2), Duration::from_millis(2300)).unwrap();
//! let engine = DownloadEngine::new(RetryPolicy::default(), pacing);
//! let mut tracker = ProgressTracker::new(10);
//! let stats = engine
//!     .run(&client, &categories, Path::new("arquivos_pessoa"), &mut tracker)
//!     .await;
//! println!("downloaded {}, failed {}", stats.downloaded, stats.failed);
//! # }
//! ```

mod client;
mod constants;
mod error;
mod orchestrator;
mod retry;

pub use client::{HttpClient, PoemFetcher};
pub use constants::{BASE_URL, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use orchestrator::{DownloadEngine, Pacing, PacingError, RunStats};
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
