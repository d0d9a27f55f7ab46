//! Run progress counter with observer hooks.
//!
//! The tracker counts *attempted* items, not successes: the orchestrator
//! increments it for failed poems too, so `current` reflects how far the
//! walk has advanced. `total` is fixed at construction; incrementing past it
//! is permitted because the total may have been computed from a stale count.

use std::fmt;

use tracing::info;

/// Observer callback invoked on every increment with `(current, total)`.
pub type ProgressObserver = Box<dyn FnMut(u64, u64) + Send>;

/// Mutable progress counter for a download run.
///
/// Observers are invoked synchronously, in registration order. A panicking
/// observer is a programming error, not a recoverable condition.
pub struct ProgressTracker {
    current: u64,
    total: u64,
    /// Digit width of `total`, used to pad the `[current/total]` line.
    width: usize,
    observers: Vec<ProgressObserver>,
}

impl ProgressTracker {
    /// Creates a tracker for `total` expected items, starting at zero.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            current: 0,
            total,
            width: total.to_string().len(),
            observers: Vec::new(),
        }
    }

    /// Advances the counter by one, logs a `[current/total]` progress line
    /// (with `label` appended when given), and notifies every observer.
    pub fn increment(&mut self, label: Option<&str>) {
        self.current += 1;

        let counter = format!(
            "[{current:0width$}/{total:0width$}]",
            current = self.current,
            total = self.total,
            width = self.width,
        );
        match label {
            Some(label) => info!("{counter} {label}"),
            None => info!("{counter}"),
        }

        for observer in &mut self.observers {
            observer(self.current, self.total);
        }
    }

    /// Registers an observer to be called on every increment.
    pub fn on_progress(&mut self, observer: impl FnMut(u64, u64) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Returns the number of items attempted so far.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Returns the expected total fixed at construction.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns completion as a percentage; `0.0` when the total is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_complete(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64) * 100.0
        }
    }

    /// Returns the run summary line, e.g. `"2/2 (100.0%)"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} ({:.1}%)",
            self.current,
            self.total,
            self.percent_complete()
        )
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("current", &self.current)
            .field("total", &self.total)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_increment_advances_current_regardless_of_label() {
        let mut tracker = ProgressTracker::new(5);
        tracker.increment(Some("0001 - Alpha.pdf"));
        tracker.increment(None);
        tracker.increment(Some("0003 - Gamma.pdf"));
        assert_eq!(tracker.current(), 3);
    }

    #[test]
    fn test_percent_complete_is_zero_for_zero_total() {
        let tracker = ProgressTracker::new(0);
        assert!((tracker.percent_complete() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_complete_monotonically_non_decreasing() {
        let mut tracker = ProgressTracker::new(4);
        let mut last = tracker.percent_complete();
        for _ in 0..4 {
            tracker.increment(None);
            let now = tracker.percent_complete();
            assert!(now >= last);
            last = now;
        }
        assert!((last - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_formats_count_and_one_decimal_percent() {
        let mut tracker = ProgressTracker::new(2);
        tracker.increment(None);
        assert_eq!(tracker.summary(), "1/2 (50.0%)");
        tracker.increment(None);
        assert_eq!(tracker.summary(), "2/2 (100.0%)");
    }

    #[test]
    fn test_summary_of_third_reports_repeating_decimal_rounded() {
        let mut tracker = ProgressTracker::new(3);
        tracker.increment(None);
        assert_eq!(tracker.summary(), "1/3 (33.3%)");
    }

    #[test]
    fn test_increment_beyond_total_is_permitted_without_clamping() {
        // The total can come from a stale count; drift is tolerated.
        let mut tracker = ProgressTracker::new(1);
        tracker.increment(None);
        tracker.increment(None);
        assert_eq!(tracker.current(), 2);
        assert!(tracker.percent_complete() > 100.0);
        assert_eq!(tracker.summary(), "2/1 (200.0%)");
    }

    #[test]
    fn test_observers_called_in_registration_order_with_counts() {
        let seen: Arc<Mutex<Vec<(&str, u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));

        let mut tracker = ProgressTracker::new(2);
        let first = Arc::clone(&seen);
        tracker.on_progress(move |current, total| {
            first.lock().unwrap().push(("first", current, total));
        });
        let second = Arc::clone(&seen);
        tracker.on_progress(move |current, total| {
            second.lock().unwrap().push(("second", current, total));
        });

        tracker.increment(None);

        let calls = seen.lock().unwrap();
        assert_eq!(*calls, vec![("first", 1, 2), ("second", 1, 2)]);
    }

    #[test]
    fn test_observer_sees_every_increment() {
        let count = Arc::new(Mutex::new(0u64));
        let mut tracker = ProgressTracker::new(3);
        let seen = Arc::clone(&count);
        tracker.on_progress(move |current, _| {
            *seen.lock().unwrap() = current;
        });

        for _ in 0..3 {
            tracker.increment(None);
        }
        assert_eq!(*count.lock().unwrap(), 3);
    }
}
