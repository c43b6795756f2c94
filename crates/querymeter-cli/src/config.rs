//! Workload configuration.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use querymeter_core::TimeUnit;
use querymeter_sql::{
    BasicSqlNameStrategy, CollectorConfig, ShortNameStrategy, SmartNameStrategy,
    StatementNameStrategy,
};

use crate::formatter::OutputFormat;

/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 4;

/// Default statements executed per worker.
pub const DEFAULT_ITERATIONS: usize = 1_000;

/// Default group used by the short naming strategy.
pub const DEFAULT_SHORT_BASE: &str = "db";

/// Largest simulated statement latency accepted, in microseconds.
pub const MAX_LATENCY_US: u64 = 60_000_000;

/// Naming strategy selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    /// Call-site names when known, statement text otherwise
    Smart,
    /// Statement text only
    Basic,
    /// Call-site simple names under a single base group
    Short,
}

/// Settings for one workload run.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of worker threads issuing statements.
    pub workers: usize,

    /// Statements each worker issues.
    pub iterations: usize,

    /// Naming strategy for recorded statements.
    pub strategy: StrategyKind,

    /// Base group for [`StrategyKind::Short`].
    pub short_base: String,

    /// Units for created timers.
    pub collector: CollectorConfig,

    /// Simulated statement latency range in microseconds, inclusive.
    pub latency_us: (u64, u64),
}

impl WorkloadConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            iterations: DEFAULT_ITERATIONS,
            strategy: StrategyKind::Smart,
            short_base: DEFAULT_SHORT_BASE.to_string(),
            collector: CollectorConfig::default(),
            latency_us: (100, 20_000),
        }
    }

    /// Set the number of workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the statements per worker.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the naming strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build the configured naming strategy.
    pub fn naming_strategy(&self) -> Arc<dyn StatementNameStrategy> {
        match self.strategy {
            StrategyKind::Smart => Arc::new(SmartNameStrategy::new()),
            StrategyKind::Basic => Arc::new(BasicSqlNameStrategy::new()),
            StrategyKind::Short => Arc::new(ShortNameStrategy::new(self.short_base.clone())),
        }
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "querymeter")]
#[command(version, long_about = None)]
#[command(about = "Record a synthetic statement workload and print its metrics")]
pub struct Args {
    /// Worker threads issuing statements.
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Statements issued per worker.
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Statement naming strategy.
    #[arg(short, long, default_value = "smart", value_enum)]
    pub strategy: StrategyKind,

    /// Base group for the short strategy.
    #[arg(long, default_value = DEFAULT_SHORT_BASE)]
    pub short_base: String,

    /// Unit durations are reported in (ns, us, ms, s, ...).
    #[arg(long, default_value = "ms")]
    pub duration_unit: TimeUnit,

    /// Unit call rates are reported per.
    #[arg(long, default_value = "s")]
    pub rate_unit: TimeUnit,

    /// Smallest simulated statement latency in microseconds.
    #[arg(
        long,
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(..=MAX_LATENCY_US)
    )]
    pub min_latency_us: u64,

    /// Largest simulated statement latency in microseconds.
    #[arg(
        long,
        default_value_t = 20_000,
        value_parser = clap::value_parser!(u64).range(..=MAX_LATENCY_US)
    )]
    pub max_latency_us: u64,

    /// Output format.
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

impl Args {
    /// Convert command-line arguments to a workload configuration.
    pub fn into_config(self) -> WorkloadConfig {
        let low = self.min_latency_us.min(self.max_latency_us);
        let high = self.min_latency_us.max(self.max_latency_us);

        WorkloadConfig {
            short_base: self.short_base,
            collector: CollectorConfig::new()
                .with_duration_unit(self.duration_unit)
                .with_rate_unit(self.rate_unit),
            latency_us: (low, high),
            ..WorkloadConfig::new()
                .with_workers(self.workers)
                .with_iterations(self.iterations)
                .with_strategy(self.strategy)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkloadConfig::default();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.strategy, StrategyKind::Smart);
        assert_eq!(config.collector, CollectorConfig::default());
    }

    #[test]
    fn test_args_into_config() {
        let args = Args::parse_from([
            "querymeter",
            "--workers",
            "0",
            "--strategy",
            "short",
            "--duration-unit",
            "us",
            "--min-latency-us",
            "500",
            "--max-latency-us",
            "10",
        ]);
        let config = args.into_config();

        assert_eq!(config.workers, 1);
        assert_eq!(config.strategy, StrategyKind::Short);
        assert_eq!(config.collector.duration_unit, TimeUnit::Microseconds);
        assert_eq!(config.collector.rate_unit, TimeUnit::Seconds);
        assert_eq!(config.latency_us, (10, 500));
    }

    #[test]
    fn test_rejects_latency_above_limit() {
        let too_long = (MAX_LATENCY_US + 1).to_string();
        let result = Args::try_parse_from(["querymeter", "--max-latency-us", too_long.as_str()]);
        assert!(result.is_err());

        let limit = MAX_LATENCY_US.to_string();
        let args =
            Args::try_parse_from(["querymeter", "--min-latency-us", limit.as_str()]).unwrap();
        assert_eq!(args.min_latency_us, MAX_LATENCY_US);
    }

    #[test]
    fn test_rejects_unknown_unit() {
        let result = Args::try_parse_from(["querymeter", "--rate-unit", "fortnights"]);
        assert!(result.is_err());
    }
}
