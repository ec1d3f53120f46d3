use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Running counters for one processor instance.
///
/// Counters never reset between batches. Updates are atomic so concurrent
/// completions can be recorded without a lock.
#[derive(Debug)]
pub struct StatsAggregator {
    processed: AtomicU64,
    failed: AtomicU64,
    start_time: DateTime<Utc>,
    started: Instant,
}

/// Point-in-time view of the counters plus derived rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub processed_count: u64,
    pub failed_count: u64,
    pub start_time: DateTime<Utc>,
    pub runtime_seconds: f64,
    pub records_per_second: f64,
    pub success_rate: f64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            processed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start_time: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed_count(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Derive rates from the current counters.
    ///
    /// Both rate denominators are clamped to at least 1. This only keeps the
    /// division finite; with a runtime under a second or very few records the
    /// numbers are not meaningful rates.
    pub fn snapshot(&self) -> Statistics {
        let processed = self.processed_count();
        let failed = self.failed_count();
        let runtime_seconds = self.started.elapsed().as_secs_f64();

        Statistics {
            processed_count: processed,
            failed_count: failed,
            start_time: self.start_time,
            runtime_seconds,
            records_per_second: processed as f64 / runtime_seconds.max(1.0),
            success_rate: processed as f64 / (processed + failed).max(1) as f64,
        }
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}
