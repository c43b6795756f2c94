//! Fixed-bucket histogram.
//!
//! This module provides a lock-free fixed-bucket histogram with percentile
//! support. Timers use it to track durations in nanoseconds.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Default latency bucket boundaries in nanoseconds.
///
/// 100us, 500us, 1ms, 5ms, 10ms, 50ms, 100ms, 500ms, 1s, 5s
const LATENCY_BUCKETS_NS: [u64; 10] = [
    100_000,       // 100 microseconds
    500_000,       // 500 microseconds
    1_000_000,     // 1 millisecond
    5_000_000,     // 5 milliseconds
    10_000_000,    // 10 milliseconds
    50_000_000,    // 50 milliseconds
    100_000_000,   // 100 milliseconds
    500_000_000,   // 500 milliseconds
    1_000_000_000, // 1 second
    5_000_000_000, // 5 seconds
];

/// Fixed-bucket histogram of `u64` samples.
///
/// All operations are lock-free using atomic operations.
pub struct Histogram {
    /// Upper bucket boundaries, ascending.
    buckets: Vec<u64>,
    /// Counts per bucket (each bucket counts values <= boundary and > the previous one).
    counts: Vec<AtomicU64>,
    sum: AtomicU64,
    count: AtomicU64,
    min: AtomicU64,
    max: AtomicU64,
}

/// Point-in-time view of a histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p99: u64,
    /// `(upper boundary, count)` per bucket.
    pub buckets: Vec<(u64, u64)>,
}

impl Histogram {
    /// Create a histogram with default latency buckets, in nanoseconds.
    pub fn latency() -> Self {
        Self::with_buckets(LATENCY_BUCKETS_NS.to_vec())
    }

    /// Create a histogram with `count` exponentially growing boundaries.
    pub fn exponential(start: u64, factor: u64, count: usize) -> Self {
        let mut buckets = Vec::with_capacity(count);
        let mut boundary = start.max(1);
        for _ in 0..count {
            buckets.push(boundary);
            boundary = boundary.saturating_mul(factor.max(2));
        }
        Self::with_buckets(buckets)
    }

    /// Create a histogram with the given upper boundaries.
    ///
    /// Boundaries are sorted and deduplicated.
    pub fn with_buckets(mut buckets: Vec<u64>) -> Self {
        buckets.sort_unstable();
        buckets.dedup();
        let counts = buckets.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            buckets,
            counts,
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
            min: AtomicU64::new(u64::MAX),
            max: AtomicU64::new(0),
        }
    }

    /// Record a value.
    pub fn update(&self, value: u64) {
        self.sum.fetch_add(value, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.min.fetch_min(value, Ordering::Relaxed);
        self.max.fetch_max(value, Ordering::Relaxed);

        let index = self.buckets.partition_point(|&boundary| boundary < value);
        // Values above the largest boundary land in the last bucket.
        let index = index.min(self.counts.len().saturating_sub(1));
        if let Some(bucket) = self.counts.get(index) {
            bucket.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Total count of observations.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of all observed values.
    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    /// Smallest observed value, or 0 when empty.
    pub fn min(&self) -> u64 {
        match self.min.load(Ordering::Relaxed) {
            u64::MAX if self.count() == 0 => 0,
            min => min,
        }
    }

    /// Largest observed value.
    pub fn max(&self) -> u64 {
        self.max.load(Ordering::Relaxed)
    }

    /// Arithmetic mean of observed values, or 0 when empty.
    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        self.sum() as f64 / count as f64
    }

    /// Approximate percentile (e.g., 0.50 for P50, 0.99 for P99).
    ///
    /// Returns the upper boundary of the bucket containing the target percentile.
    pub fn percentile(&self, p: f64) -> u64 {
        let total = self.count();
        if total == 0 {
            return 0;
        }

        let target = ((total as f64 * p.clamp(0.0, 1.0)).ceil() as u64).max(1);
        let mut cumulative = 0u64;

        for (i, count) in self.counts.iter().enumerate() {
            cumulative += count.load(Ordering::Relaxed);
            if cumulative >= target {
                return self.buckets[i];
            }
        }

        *self.buckets.last().unwrap_or(&0)
    }

    /// Median.
    pub fn p50(&self) -> u64 {
        self.percentile(0.50)
    }

    /// 99th percentile.
    pub fn p99(&self) -> u64 {
        self.percentile(0.99)
    }

    /// Reset all counters to zero.
    pub fn clear(&self) {
        self.sum.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
        self.min.store(u64::MAX, Ordering::Relaxed);
        self.max.store(0, Ordering::Relaxed);
        for count in &self.counts {
            count.store(0, Ordering::Relaxed);
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count(),
            sum: self.sum(),
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            p50: self.p50(),
            p99: self.p99(),
            buckets: self
                .buckets
                .iter()
                .zip(self.counts.iter())
                .map(|(&boundary, count)| (boundary, count.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::latency()
    }
}

impl std::fmt::Debug for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Histogram")
            .field("count", &self.count())
            .field("min", &self.min())
            .field("max", &self.max())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_update() {
        let hist = Histogram::latency();
        hist.update(50_000); // bucket 0 (<=100us)
        hist.update(200_000); // bucket 1 (<=500us)
        hist.update(1_500_000); // bucket 3 (<=5ms)

        assert_eq!(hist.count(), 3);
        assert_eq!(hist.sum(), 50_000 + 200_000 + 1_500_000);

        let snapshot = hist.snapshot();
        assert_eq!(snapshot.buckets[0], (100_000, 1));
        assert_eq!(snapshot.buckets[1], (500_000, 1));
        assert_eq!(snapshot.buckets[2], (1_000_000, 0));
        assert_eq!(snapshot.buckets[3], (5_000_000, 1));
    }

    #[test]
    fn test_histogram_boundary_is_inclusive() {
        let hist = Histogram::with_buckets(vec![10, 20]);
        hist.update(10);
        hist.update(11);

        let snapshot = hist.snapshot();
        assert_eq!(snapshot.buckets, vec![(10, 1), (20, 1)]);
    }

    #[test]
    fn test_histogram_overflow_goes_to_last_bucket() {
        let hist = Histogram::with_buckets(vec![10, 20]);
        hist.update(1_000);
        assert_eq!(hist.snapshot().buckets, vec![(10, 0), (20, 1)]);
        assert_eq!(hist.max(), 1_000);
    }

    #[test]
    fn test_histogram_min_max_mean() {
        let hist = Histogram::latency();
        hist.update(100);
        hist.update(5000);
        hist.update(1000);

        assert_eq!(hist.min(), 100);
        assert_eq!(hist.max(), 5000);
        assert!((hist.mean() - 2033.333).abs() < 0.01);
    }

    #[test]
    fn test_histogram_percentile() {
        let hist = Histogram::latency();
        for _ in 0..100 {
            hist.update(50_000);
        }
        assert_eq!(hist.p50(), 100_000);
        assert_eq!(hist.p99(), 100_000);

        for _ in 0..100 {
            hist.update(800_000);
        }
        assert_eq!(hist.p50(), 100_000); // First 100 samples are in bucket 0
        assert_eq!(hist.p99(), 1_000_000); // 99th percentile is in bucket 2
    }

    #[test]
    fn test_histogram_empty() {
        let hist = Histogram::latency();
        assert_eq!(hist.count(), 0);
        assert_eq!(hist.mean(), 0.0);
        assert_eq!(hist.min(), 0);
        assert_eq!(hist.max(), 0);
        assert_eq!(hist.p50(), 0);
    }

    #[test]
    fn test_histogram_clear() {
        let hist = Histogram::latency();
        hist.update(1000);
        hist.update(2000);
        hist.clear();

        assert_eq!(hist.count(), 0);
        assert_eq!(hist.sum(), 0);
        assert_eq!(hist.min(), 0);
        assert_eq!(hist.max(), 0);
    }

    #[test]
    fn test_exponential_buckets() {
        let hist = Histogram::exponential(1, 10, 4);
        let boundaries: Vec<u64> = hist.snapshot().buckets.iter().map(|(b, _)| *b).collect();
        assert_eq!(boundaries, vec![1, 10, 100, 1000]);
    }
}
