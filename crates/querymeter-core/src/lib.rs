//! querymeter core - metric identities, metric primitives and the registry.
//!
//! This crate provides the pieces every instrumentation adapter builds on:
//! [`MetricName`] for stable metric identity, and [`MetricsRegistry`] for
//! sharing exactly one live metric per name across threads.

pub mod error;
pub mod metrics;
pub mod name;
pub mod time_unit;

pub use error::{MetricsError, Result};
pub use metrics::{
    new_shared_registry, Counter, Histogram, HistogramSnapshot, Meter, Metric, MetricKind,
    MetricPredicate, MetricSnapshot, MetricsRegistry, MetricsRegistryListener, RegisteredMetric,
    SharedMetricsRegistry, Timer, TimerSnapshot,
};
pub use name::{MetricName, MetricNameBuilder};
pub use time_unit::{ParseTimeUnitError, TimeUnit};
