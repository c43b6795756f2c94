//! Statement timing collection.
//!
//! The host framework reports each completed statement with its elapsed time
//! in nanoseconds. [`InstrumentedTimingCollector`] names the statement with its
//! [`StatementNameStrategy`], fetches (or creates) the timer registered under
//! that name, and records the duration.

use std::sync::Arc;

use querymeter_core::{Result, SharedMetricsRegistry, TimeUnit, Timer};

use crate::config::CollectorConfig;
use crate::context::StatementContext;
use crate::strategy::{SmartNameStrategy, StatementNameStrategy};

/// Hook the host framework calls after each statement completes.
pub trait TimingCollector: Send + Sync {
    /// Record that the statement described by `ctx` took `elapsed_ns` nanoseconds.
    fn collect(&self, elapsed_ns: u64, ctx: &StatementContext) -> Result<()>;
}

/// Records statement durations into per-statement timers.
///
/// Errors from the registry (a statement name already used by a non-timer
/// metric) are returned to the caller rather than dropped.
pub struct InstrumentedTimingCollector {
    registry: SharedMetricsRegistry,
    strategy: Arc<dyn StatementNameStrategy>,
    config: CollectorConfig,
}

impl InstrumentedTimingCollector {
    /// Create a collector using [`SmartNameStrategy`] and the default units.
    pub fn new(registry: SharedMetricsRegistry) -> Self {
        Self::with_strategy(registry, SmartNameStrategy::new())
    }

    /// Create a collector with the given naming strategy and the default units.
    pub fn with_strategy(
        registry: SharedMetricsRegistry,
        strategy: impl StatementNameStrategy + 'static,
    ) -> Self {
        Self::with_config(registry, Arc::new(strategy), CollectorConfig::default())
    }

    /// Create a collector with the given naming strategy and units.
    pub fn with_config(
        registry: SharedMetricsRegistry,
        strategy: Arc<dyn StatementNameStrategy>,
        config: CollectorConfig,
    ) -> Self {
        Self {
            registry,
            strategy,
            config,
        }
    }

    /// Timer the statement described by `ctx` is recorded into.
    pub fn timer_for(&self, ctx: &StatementContext) -> Result<Arc<Timer>> {
        let name = self.strategy.statement_name(ctx);
        self.registry
            .timer(&name, self.config.duration_unit, self.config.rate_unit)
    }

    /// Record `elapsed_ns` for the statement described by `ctx` and return
    /// the timer it was recorded into.
    pub fn record(&self, elapsed_ns: u64, ctx: &StatementContext) -> Result<Arc<Timer>> {
        let timer = self.timer_for(ctx)?;
        timer.update(elapsed_ns, TimeUnit::Nanoseconds);
        Ok(timer)
    }

    /// Registry timers are created in.
    pub fn registry(&self) -> &SharedMetricsRegistry {
        &self.registry
    }

    /// Units applied to created timers.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}

impl TimingCollector for InstrumentedTimingCollector {
    fn collect(&self, elapsed_ns: u64, ctx: &StatementContext) -> Result<()> {
        self.record(elapsed_ns, ctx).map(|_| ())
    }
}

impl std::fmt::Debug for InstrumentedTimingCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstrumentedTimingCollector")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
