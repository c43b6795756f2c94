//! Event meter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::time_unit::TimeUnit;

/// Counts events and reports their mean rate since creation.
#[derive(Debug)]
pub struct Meter {
    event_type: String,
    rate_unit: TimeUnit,
    started_at: Instant,
    count: AtomicU64,
}

impl Meter {
    /// Create a meter for `event_type` events, reporting rates per `rate_unit`.
    pub fn new(event_type: impl Into<String>, rate_unit: TimeUnit) -> Self {
        Self {
            event_type: event_type.into(),
            rate_unit,
            started_at: Instant::now(),
            count: AtomicU64::new(0),
        }
    }

    /// Record one event.
    pub fn mark(&self) {
        self.mark_n(1);
    }

    /// Record `n` events.
    pub fn mark_n(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Kind of event being metered (e.g., "calls").
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Unit of the rate denominator.
    pub fn rate_unit(&self) -> TimeUnit {
        self.rate_unit
    }

    /// Number of events recorded.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean number of events per rate unit since creation.
    pub fn mean_rate(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            return 0.0;
        }
        let elapsed_ns = self.started_at.elapsed().as_nanos() as f64;
        if elapsed_ns <= 0.0 {
            return 0.0;
        }
        count as f64 / self.rate_unit.from_nanos_f64(elapsed_ns)
    }
}
