//! Metric primitives and the metrics registry.
//!
//! # Usage
//!
//! ```ignore
//! use querymeter_core::metrics::new_shared_registry;
//! use querymeter_core::{MetricName, TimeUnit};
//!
//! // Create a shared registry
//! let registry = new_shared_registry();
//!
//! // Get or create a timer; later calls with the same name return the same instance
//! let name = MetricName::new("com.example", "UserDao", "findById");
//! let timer = registry.timer(&name, TimeUnit::Milliseconds, TimeUnit::Seconds)?;
//! timer.update(1_500_000, TimeUnit::Nanoseconds);
//!
//! // Reusing the name for another kind is an error
//! assert!(registry.counter(&name).is_err());
//! ```

mod counter;
mod histogram;
mod meter;
mod registry;
mod timer;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

pub use counter::Counter;
pub use histogram::{Histogram, HistogramSnapshot};
pub use meter::Meter;
pub use registry::{
    new_shared_registry, MetricPredicate, MetricsRegistry, MetricsRegistryListener,
    SharedMetricsRegistry,
};
pub use timer::{Timer, TimerSnapshot};

/// Category of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// [`Counter`].
    Counter,
    /// [`Histogram`].
    Histogram,
    /// [`Meter`].
    Meter,
    /// [`Timer`].
    Timer,
}

impl MetricKind {
    /// Lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
            MetricKind::Meter => "meter",
            MetricKind::Timer => "timer",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live metric held by the registry.
#[derive(Debug, Clone)]
pub enum RegisteredMetric {
    Counter(Arc<Counter>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
}

impl RegisteredMetric {
    /// Kind of the held metric.
    pub fn kind(&self) -> MetricKind {
        match self {
            RegisteredMetric::Counter(_) => MetricKind::Counter,
            RegisteredMetric::Histogram(_) => MetricKind::Histogram,
            RegisteredMetric::Meter(_) => MetricKind::Meter,
            RegisteredMetric::Timer(_) => MetricKind::Timer,
        }
    }

    /// Point-in-time values of the held metric.
    pub fn snapshot(&self) -> MetricSnapshot {
        match self {
            RegisteredMetric::Counter(counter) => MetricSnapshot::Counter {
                count: counter.count(),
            },
            RegisteredMetric::Histogram(histogram) => {
                MetricSnapshot::Histogram(histogram.snapshot())
            }
            RegisteredMetric::Meter(meter) => MetricSnapshot::Meter {
                event_type: meter.event_type().to_string(),
                count: meter.count(),
                mean_rate: meter.mean_rate(),
            },
            RegisteredMetric::Timer(timer) => MetricSnapshot::Timer(timer.snapshot()),
        }
    }
}

/// Serializable view of a [`RegisteredMetric`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MetricSnapshot {
    Counter {
        count: i64,
    },
    Histogram(HistogramSnapshot),
    Meter {
        event_type: String,
        count: u64,
        mean_rate: f64,
    },
    Timer(TimerSnapshot),
}

/// A metric type the registry can hold.
///
/// The registry stores metrics as [`RegisteredMetric`]; this trait converts
/// between the concrete type and that representation so that typed lookups
/// can detect kind mismatches.
pub trait Metric: Send + Sync + Sized + 'static {
    /// Kind of this metric type.
    const KIND: MetricKind;

    /// Wrap a shared instance for storage.
    fn into_registered(self: Arc<Self>) -> RegisteredMetric;

    /// Extract a shared instance if `metric` is of this type.
    fn from_registered(metric: &RegisteredMetric) -> Option<Arc<Self>>;
}

impl Metric for Counter {
    const KIND: MetricKind = MetricKind::Counter;

    fn into_registered(self: Arc<Self>) -> RegisteredMetric {
        RegisteredMetric::Counter(self)
    }

    fn from_registered(metric: &RegisteredMetric) -> Option<Arc<Self>> {
        match metric {
            RegisteredMetric::Counter(counter) => Some(Arc::clone(counter)),
            _ => None,
        }
    }
}

impl Metric for Histogram {
    const KIND: MetricKind = MetricKind::Histogram;

    fn into_registered(self: Arc<Self>) -> RegisteredMetric {
        RegisteredMetric::Histogram(self)
    }

    fn from_registered(metric: &RegisteredMetric) -> Option<Arc<Self>> {
        match metric {
            RegisteredMetric::Histogram(histogram) => Some(Arc::clone(histogram)),
            _ => None,
        }
    }
}

impl Metric for Meter {
    const KIND: MetricKind = MetricKind::Meter;

    fn into_registered(self: Arc<Self>) -> RegisteredMetric {
        RegisteredMetric::Meter(self)
    }

    fn from_registered(metric: &RegisteredMetric) -> Option<Arc<Self>> {
        match metric {
            RegisteredMetric::Meter(meter) => Some(Arc::clone(meter)),
            _ => None,
        }
    }
}

impl Metric for Timer {
    const KIND: MetricKind = MetricKind::Timer;

    fn into_registered(self: Arc<Self>) -> RegisteredMetric {
        RegisteredMetric::Timer(self)
    }

    fn from_registered(metric: &RegisteredMetric) -> Option<Arc<Self>> {
        match metric {
            RegisteredMetric::Timer(timer) => Some(Arc::clone(timer)),
            _ => None,
        }
    }
}
