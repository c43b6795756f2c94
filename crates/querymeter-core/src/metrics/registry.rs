//! Central metrics registry.
//!
//! The registry maps each [`MetricName`] to exactly one live metric. Lookups
//! of existing metrics take a shard read lock only; creation goes through the
//! shard-scoped entry API so the factory for a given name runs at most once,
//! however many threads race to create it.
//!
//! Creations, removals and listener registration are serialized by the
//! listener lock, so every listener observes each name's additions and
//! removals exactly once and in the order they happened.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Counter, Histogram, Meter, Metric, RegisteredMetric, Timer};
use crate::error::{MetricsError, Result};
use crate::name::MetricName;
use crate::time_unit::TimeUnit;

/// Receives notifications when metrics are added to or removed from a registry.
///
/// Callbacks run on the thread that changed the registry, after the change
/// is visible and with no shard lock held. They must not create or remove
/// metrics or change the registry's listeners.
pub trait MetricsRegistryListener: Send + Sync {
    /// Called after `metric` was registered under `name`.
    fn on_metric_added(&self, name: &MetricName, metric: &RegisteredMetric);

    /// Called after the metric registered under `name` was removed.
    fn on_metric_removed(&self, name: &MetricName);
}

/// Selects metrics for [`MetricsRegistry::grouped_metrics_matching`].
pub trait MetricPredicate {
    /// Whether the metric should be included.
    fn matches(&self, name: &MetricName, metric: &RegisteredMetric) -> bool;
}

impl<F> MetricPredicate for F
where
    F: Fn(&MetricName, &RegisteredMetric) -> bool,
{
    fn matches(&self, name: &MetricName, metric: &RegisteredMetric) -> bool {
        self(name, metric)
    }
}

/// Concurrent store of live metrics keyed by name.
pub struct MetricsRegistry {
    metrics: DashMap<MetricName, RegisteredMetric>,
    listeners: Mutex<Vec<Arc<dyn MetricsRegistryListener>>>,
}

impl MetricsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            metrics: DashMap::new(),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Return the metric registered under `name`, creating it with `factory`
    /// if there is none.
    ///
    /// Under concurrent calls for the same name, `factory` runs at most once
    /// and every caller receives the same instance. Fails with
    /// [`MetricsError::KindMismatch`] if `name` is bound to another kind.
    ///
    /// `factory` runs while the name's shard is locked and must not call back
    /// into the registry.
    pub fn get_or_create<M, F>(&self, name: &MetricName, factory: F) -> Result<Arc<M>>
    where
        M: Metric,
        F: FnOnce() -> M,
    {
        if let Some(existing) = self.metrics.get(name) {
            return Self::typed(name, existing.value());
        }

        let listeners = self.listeners.lock();
        let mut created = false;
        let metric = self
            .metrics
            .entry(name.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(factory()).into_registered()
            })
            .value()
            .clone();

        if created {
            debug!(metric = %name, kind = %M::KIND, "registered metric");
            for listener in listeners.iter() {
                listener.on_metric_added(name, &metric);
            }
        }
        drop(listeners);

        Self::typed(name, &metric)
    }

    /// Return the counter registered under `name`, creating it if needed.
    pub fn counter(&self, name: &MetricName) -> Result<Arc<Counter>> {
        self.get_or_create(name, Counter::new)
    }

    /// Return the histogram registered under `name`, creating it if needed.
    pub fn histogram(&self, name: &MetricName) -> Result<Arc<Histogram>> {
        self.get_or_create(name, Histogram::default)
    }

    /// Return the meter registered under `name`, creating it if needed.
    ///
    /// `event_type` and `rate_unit` only apply when the meter is created.
    pub fn meter(
        &self,
        name: &MetricName,
        event_type: &str,
        rate_unit: TimeUnit,
    ) -> Result<Arc<Meter>> {
        self.get_or_create(name, || Meter::new(event_type, rate_unit))
    }

    /// Return the timer registered under `name`, creating it if needed.
    ///
    /// The units only apply when the timer is created.
    pub fn timer(
        &self,
        name: &MetricName,
        duration_unit: TimeUnit,
        rate_unit: TimeUnit,
    ) -> Result<Arc<Timer>> {
        self.get_or_create(name, || Timer::new(duration_unit, rate_unit))
    }

    /// Return the metric registered under `name`, if any.
    pub fn get(&self, name: &MetricName) -> Option<RegisteredMetric> {
        self.metrics.get(name).map(|entry| entry.value().clone())
    }

    /// Remove the metric registered under `name`.
    ///
    /// Returns `true` if a metric was removed. A later `get_or_create` for the
    /// same name creates a fresh metric.
    pub fn remove(&self, name: &MetricName) -> bool {
        let listeners = self.listeners.lock();
        match self.metrics.remove(name) {
            Some((name, metric)) => {
                debug!(metric = %name, kind = %metric.kind(), "removed metric");
                for listener in listeners.iter() {
                    listener.on_metric_removed(&name);
                }
                true
            }
            None => false,
        }
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// Whether the registry holds no metrics.
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Snapshot of all registered metrics, sorted by name.
    ///
    /// Metrics registered while the snapshot is taken may or may not be included.
    pub fn all_metrics(&self) -> Vec<(MetricName, RegisteredMetric)> {
        let mut metrics: Vec<_> = self
            .metrics
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        metrics.sort_by(|(a, _), (b, _)| a.cmp(b));
        metrics
    }

    /// Snapshot of all registered metrics grouped by [`MetricName::group`].
    pub fn grouped_metrics(&self) -> BTreeMap<String, BTreeMap<MetricName, RegisteredMetric>> {
        self.grouped_metrics_matching(|_: &MetricName, _: &RegisteredMetric| true)
    }

    /// Snapshot of the metrics accepted by `predicate`, grouped by
    /// [`MetricName::group`].
    pub fn grouped_metrics_matching<P: MetricPredicate>(
        &self,
        predicate: P,
    ) -> BTreeMap<String, BTreeMap<MetricName, RegisteredMetric>> {
        let mut groups: BTreeMap<String, BTreeMap<MetricName, RegisteredMetric>> = BTreeMap::new();
        for entry in self.metrics.iter() {
            if predicate.matches(entry.key(), entry.value()) {
                groups
                    .entry(entry.key().group().to_string())
                    .or_default()
                    .insert(entry.key().clone(), entry.value().clone());
            }
        }
        groups
    }

    /// Register a listener.
    ///
    /// The listener is first told about every metric already registered.
    /// Metrics created or removed concurrently are reported either in that
    /// replay or afterwards, never both and never neither.
    pub fn add_listener(&self, listener: Arc<dyn MetricsRegistryListener>) {
        let mut listeners = self.listeners.lock();
        for (name, metric) in self.all_metrics() {
            listener.on_metric_added(&name, &metric);
        }
        listeners.push(listener);
    }

    /// Unregister a listener previously passed to [`add_listener`](Self::add_listener).
    pub fn remove_listener(&self, listener: &Arc<dyn MetricsRegistryListener>) {
        let target = Arc::as_ptr(listener) as *const ();
        self.listeners
            .lock()
            .retain(|registered| Arc::as_ptr(registered) as *const () != target);
    }

    fn typed<M: Metric>(name: &MetricName, metric: &RegisteredMetric) -> Result<Arc<M>> {
        M::from_registered(metric).ok_or_else(|| {
            warn!(
                metric = %name,
                existing = %metric.kind(),
                requested = %M::KIND,
                "metric name reused for a different kind"
            );
            MetricsError::KindMismatch {
                name: name.clone(),
                existing: metric.kind(),
                requested: M::KIND,
            }
        })
    }

}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("metrics", &self.metrics.len())
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

/// Shared metrics registry handle.
pub type SharedMetricsRegistry = Arc<MetricsRegistry>;

/// Create a new shared metrics registry.
pub fn new_shared_registry() -> SharedMetricsRegistry {
    Arc::new(MetricsRegistry::new())
}
