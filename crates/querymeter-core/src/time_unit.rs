//! Time units used for durations and rates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Granularity of a duration or of a rate denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
}

impl TimeUnit {
    /// Number of nanoseconds in one unit.
    pub const fn nanos_per_unit(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
            TimeUnit::Hours => 3_600_000_000_000,
            TimeUnit::Days => 86_400_000_000_000,
        }
    }

    /// Convert `value` in this unit to nanoseconds, saturating on overflow.
    pub fn to_nanos(self, value: u64) -> u64 {
        value.saturating_mul(self.nanos_per_unit())
    }

    /// Convert `value` expressed in `source` into this unit, truncating.
    pub fn convert(self, value: u64, source: TimeUnit) -> u64 {
        source.to_nanos(value) / self.nanos_per_unit()
    }

    /// Express a nanosecond count in this unit without truncation.
    pub fn from_nanos_f64(self, nanos: f64) -> f64 {
        nanos / self.nanos_per_unit() as f64
    }

    /// Lowercase plural name of the unit.
    pub const fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown time unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time unit: {0}")]
pub struct ParseTimeUnitError(String);

impl FromStr for TimeUnit {
    type Err = ParseTimeUnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "micros" | "microseconds" => Ok(TimeUnit::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hours" => Ok(TimeUnit::Hours),
            "d" | "days" => Ok(TimeUnit::Days),
            _ => Err(ParseTimeUnitError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert() {
        assert_eq!(TimeUnit::Milliseconds.convert(1_500_000, TimeUnit::Nanoseconds), 1);
        assert_eq!(TimeUnit::Nanoseconds.convert(2, TimeUnit::Seconds), 2_000_000_000);
        assert_eq!(TimeUnit::Minutes.convert(1, TimeUnit::Hours), 60);
    }

    #[test]
    fn test_to_nanos_saturates() {
        assert_eq!(TimeUnit::Days.to_nanos(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_from_nanos_f64() {
        let millis = TimeUnit::Milliseconds.from_nanos_f64(1_500_000.0);
        assert!((millis - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("ms".parse::<TimeUnit>().unwrap(), TimeUnit::Milliseconds);
        assert_eq!("Seconds".parse::<TimeUnit>().unwrap(), TimeUnit::Seconds);
        assert!("fortnights".parse::<TimeUnit>().is_err());
        assert_eq!(TimeUnit::Microseconds.to_string(), "microseconds");
    }
}
