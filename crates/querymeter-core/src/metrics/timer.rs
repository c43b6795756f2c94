//! Duration timer.
//!
//! A [`Timer`] combines a [`Histogram`] of durations with a [`Meter`] of
//! calls. Durations are stored in nanoseconds and reported in the timer's
//! duration unit; call rates are reported per its rate unit.

use std::time::{Duration, Instant};

use serde::Serialize;

use super::histogram::Histogram;
use super::meter::Meter;
use crate::time_unit::TimeUnit;

/// Histogram of durations plus a call-rate meter.
#[derive(Debug)]
pub struct Timer {
    duration_unit: TimeUnit,
    histogram: Histogram,
    meter: Meter,
}

/// Point-in-time view of a timer, in the timer's units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub count: u64,
    pub duration_unit: TimeUnit,
    pub rate_unit: TimeUnit,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p99: f64,
    pub mean_rate: f64,
}

impl Timer {
    /// Create a timer reporting durations in `duration_unit` and rates per `rate_unit`.
    pub fn new(duration_unit: TimeUnit, rate_unit: TimeUnit) -> Self {
        Self {
            duration_unit,
            histogram: Histogram::latency(),
            meter: Meter::new("calls", rate_unit),
        }
    }

    /// Record a duration of `value` expressed in `unit`.
    pub fn update(&self, value: u64, unit: TimeUnit) {
        self.histogram.update(unit.to_nanos(value));
        self.meter.mark();
    }

    /// Record a [`Duration`].
    pub fn update_duration(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.update(nanos, TimeUnit::Nanoseconds);
    }

    /// Run `f`, record how long it took, and return its result.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.update_duration(started.elapsed());
        result
    }

    /// Unit durations are reported in.
    pub fn duration_unit(&self) -> TimeUnit {
        self.duration_unit
    }

    /// Unit rates are reported per.
    pub fn rate_unit(&self) -> TimeUnit {
        self.meter.rate_unit()
    }

    /// Number of recorded durations.
    pub fn count(&self) -> u64 {
        self.histogram.count()
    }

    /// Shortest duration.
    pub fn min(&self) -> f64 {
        self.scale(self.histogram.min() as f64)
    }

    /// Longest duration.
    pub fn max(&self) -> f64 {
        self.scale(self.histogram.max() as f64)
    }

    /// Mean duration.
    pub fn mean(&self) -> f64 {
        self.scale(self.histogram.mean())
    }

    /// Approximate duration percentile (bucket upper boundary).
    pub fn percentile(&self, p: f64) -> f64 {
        self.scale(self.histogram.percentile(p) as f64)
    }

    /// Mean calls per rate unit since creation.
    pub fn mean_rate(&self) -> f64 {
        self.meter.mean_rate()
    }

    /// Total recorded time in nanoseconds.
    pub fn sum_nanos(&self) -> u64 {
        self.histogram.sum()
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            count: self.count(),
            duration_unit: self.duration_unit,
            rate_unit: self.rate_unit(),
            min: self.min(),
            max: self.max(),
            mean: self.mean(),
            p50: self.percentile(0.50),
            p99: self.percentile(0.99),
            mean_rate: self.mean_rate(),
        }
    }

    fn scale(&self, nanos: f64) -> f64 {
        self.duration_unit.from_nanos_f64(nanos)
    }
}
