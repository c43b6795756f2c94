//! Collector configuration.

use querymeter_core::TimeUnit;
use serde::{Deserialize, Serialize};

/// Default unit for recorded durations.
pub const DEFAULT_DURATION_UNIT: TimeUnit = TimeUnit::Milliseconds;

/// Default unit for call rates.
pub const DEFAULT_RATE_UNIT: TimeUnit = TimeUnit::Seconds;

/// Units applied to the timers an
/// [`InstrumentedTimingCollector`](crate::InstrumentedTimingCollector) creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Unit timers report durations in.
    pub duration_unit: TimeUnit,

    /// Unit timers report call rates per.
    pub rate_unit: TimeUnit,
}

impl CollectorConfig {
    /// Create a configuration with the default units.
    pub fn new() -> Self {
        Self {
            duration_unit: DEFAULT_DURATION_UNIT,
            rate_unit: DEFAULT_RATE_UNIT,
        }
    }

    /// Set the duration unit.
    pub fn with_duration_unit(mut self, unit: TimeUnit) -> Self {
        self.duration_unit = unit;
        self
    }

    /// Set the rate unit.
    pub fn with_rate_unit(mut self, unit: TimeUnit) -> Self {
        self.rate_unit = unit;
        self
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::new()
    }
}
