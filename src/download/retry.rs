//! Retry policy with exponential backoff for transient fetch failures.
//!
//! Every fetch failure is treated as retryable: the origin serves static
//! PDFs and even its 404s have been observed to clear up between runs, so
//! there is no permanent/transient classification here. The policy only
//! decides how many attempts a poem gets and how long to wait between them.
//!
//! With the defaults (3 attempts, 2s base, x2 multiplier) the delays are
//! 2s before the second attempt and 4s before the third.

use std::time::Duration;

/// Default maximum attempts per poem, including the initial attempt.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay before the first retry (2 seconds).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Default backoff multiplier (doubles each retry).
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Configuration for the per-poem retry loop.
///
/// Delay before retry after the `n`-th failed attempt:
/// `base_delay * multiplier^(n - 1)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Delay before the first retry.
    base_delay: Duration,

    /// Multiplier applied each further retry.
    backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom attempt budget and default delays.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay to wait after `failed_attempt` (1-indexed) before
    /// the next attempt.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn backoff_delay(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1);
        let delay_ms =
            self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent as i32);
        Duration::from_millis(delay_ms as u64)
    }
}
