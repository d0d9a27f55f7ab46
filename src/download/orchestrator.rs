//! Sequential download orchestrator for the category tree.
//!
//! The engine walks categories in pre-order (a category's own poems first,
//! then its subcategories in sequence order), fetching each poem through the
//! [`PoemFetcher`] seam with per-item retry. One poem's exhausted retries
//! never abort the walk: the failure is logged, the tracker is still
//! incremented, and the run continues. After every poem — success or
//! failure — the engine sleeps for a uniform random duration drawn from the
//! pacing window. This is a deliberate anti-overload measure, not an
//! optimization target.
//!
//! The input tree is expected to be pre-reduced by the missing-set resolver;
//! the engine never re-checks file existence and will happily overwrite.

use std::path::Path;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::error::DownloadError;
use super::retry::RetryPolicy;
use crate::catalog::Category;
use crate::download::PoemFetcher;
use crate::progress::ProgressTracker;

/// Invalid pacing window.
#[derive(Debug, Error)]
#[error("invalid pacing window: min_delay {min_ms}ms exceeds max_delay {max_ms}ms")]
pub struct PacingError {
    /// The minimum delay that was requested, in milliseconds.
    pub min_ms: u64,
    /// The maximum delay that was requested, in milliseconds.
    pub max_ms: u64,
}

/// Inter-request pacing window.
///
/// After each poem the engine sleeps for a duration drawn uniformly at
/// random from `[min_delay, max_delay]`.
#[derive(Debug, Clone)]
pub struct Pacing {
    min_delay: Duration,
    max_delay: Duration,
}

impl Pacing {
    /// Creates a pacing window.
    ///
    /// # Errors
    ///
    /// Returns [`PacingError`] when `min_delay > max_delay`.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Result<Self, PacingError> {
        if min_delay > max_delay {
            return Err(PacingError {
                min_ms: duration_ms(min_delay),
                max_ms: duration_ms(max_delay),
            });
        }
        Ok(Self {
            min_delay,
            max_delay,
        })
    }

    /// A zero-width window that never sleeps; for tests.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Draws a delay uniformly from the window.
    #[must_use]
    pub fn draw(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        let ms = rand::thread_rng().gen_range(duration_ms(self.min_delay)..=duration_ms(self.max_delay));
        Duration::from_millis(ms)
    }

    /// Sleeps for a freshly drawn delay, skipping the syscall for a
    /// zero-width zero window.
    pub async fn pause(&self) {
        let delay = self.draw();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// Outcome counters for one orchestrator run.
///
/// Per-item identities are only reported through log lines; a caller who
/// wants a second pass re-runs the missing-set resolver against the updated
/// file store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Poems fetched and persisted.
    pub downloaded: u64,
    /// Poems skipped after exhausted retries or a failed write.
    pub failed: u64,
}

impl RunStats {
    /// Total poems attempted (downloaded + failed).
    #[must_use]
    pub fn attempted(&self) -> u64 {
        self.downloaded + self.failed
    }
}

/// Sequential download engine with retry and pacing.
///
/// Single logical thread of control: fetches never overlap, and the only
/// suspension points are the fetch itself, retry backoff, and the pacing
/// gate.
#[derive(Debug)]
pub struct DownloadEngine {
    retry_policy: RetryPolicy,
    pacing: Pacing,
}

impl DownloadEngine {
    /// Creates an engine with the given retry policy and pacing window.
    #[must_use]
    pub fn new(retry_policy: RetryPolicy, pacing: Pacing) -> Self {
        Self {
            retry_policy,
            pacing,
        }
    }

    /// Walks the category forest, downloading every poem it contains.
    ///
    /// The tracker is incremented once per poem whether the poem succeeded
    /// or not, so its `current` reflects attempted items.
    #[instrument(skip_all, fields(base_path = %base_path.display()))]
    pub async fn run(
        &self,
        fetcher: &dyn PoemFetcher,
        categories: &[Category],
        base_path: &Path,
        tracker: &mut ProgressTracker,
    ) -> RunStats {
        let mut stats = RunStats::default();
        for category in categories {
            self.download_category(fetcher, category, base_path, tracker, &mut stats)
                .await;
        }
        info!(
            downloaded = stats.downloaded,
            failed = stats.failed,
            "download walk complete"
        );
        stats
    }

    /// Downloads one category subtree: own poems first, then subcategories.
    fn download_category<'a>(
        &'a self,
        fetcher: &'a dyn PoemFetcher,
        category: &'a Category,
        base_path: &'a Path,
        tracker: &'a mut ProgressTracker,
        stats: &'a mut RunStats,
    ) -> BoxFuture<'a, ()> {
        async move {
            let dir = category.dir_path(base_path);
            if let Err(error) = tokio::fs::create_dir_all(&dir).await {
                // Not fatal for the walk: each poem write below will fail
                // individually and be counted as a failed item.
                warn!(dir = %dir.display(), %error, "failed to create category directory");
            }

            if !category.poems.is_empty() {
                info!(
                    count = category.poems.len(),
                    category = %category.name,
                    "downloading poems"
                );
            }

            for poem in &category.poems {
                let filename = poem.pdf_filename();
                let target = dir.join(&filename);

                match self.fetch_with_retry(fetcher, poem.id).await {
                    Ok(bytes) => match write_poem(&target, &bytes).await {
                        Ok(()) => {
                            stats.downloaded += 1;
                            tracker.increment(Some(&filename));
                        }
                        Err(error) => {
                            warn!(%filename, %error, "failed to persist fetched poem");
                            stats.failed += 1;
                            tracker.increment(None);
                        }
                    },
                    Err(error) => {
                        warn!(%filename, %error, "download failed after retries");
                        stats.failed += 1;
                        tracker.increment(None);
                    }
                }

                self.pacing.pause().await;
            }

            for sub in &category.subcategories {
                self.download_category(fetcher, sub, base_path, tracker, stats)
                    .await;
            }
        }
        .boxed()
    }

    /// Fetches one poem, retrying with exponential backoff until the
    /// attempt budget is spent. Any failure is retryable.
    async fn fetch_with_retry(
        &self,
        fetcher: &dyn PoemFetcher,
        poem_id: u32,
    ) -> Result<Vec<u8>, DownloadError> {
        let max_attempts = self.retry_policy.max_attempts();
        let mut attempt = 1;
        loop {
            match fetcher.fetch(poem_id).await {
                Ok(bytes) => return Ok(bytes),
                Err(error) => {
                    if attempt >= max_attempts {
                        return Err(error);
                    }
                    let delay = self.retry_policy.backoff_delay(attempt);
                    debug!(
                        poem_id,
                        attempt,
                        delay_ms = duration_ms(delay),
                        %error,
                        "retrying fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Writes a fetched payload, creating parent directories if absent.
async fn write_poem(path: &Path, bytes: &[u8]) -> Result<(), DownloadError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| DownloadError::io(path, e))
}
