//! querymeter SQL - statement timing for instrumented database access.
//!
//! Hosts call a [`TimingCollector`] after each statement. The
//! [`InstrumentedTimingCollector`] names the statement with a pluggable
//! [`StatementNameStrategy`] and records its duration in a timer from a
//! shared [`MetricsRegistry`](querymeter_core::MetricsRegistry).
//!
//! ```ignore
//! use querymeter_core::new_shared_registry;
//! use querymeter_sql::{InstrumentedTimingCollector, StatementContext, TimingCollector};
//!
//! let registry = new_shared_registry();
//! let collector = InstrumentedTimingCollector::new(registry.clone());
//!
//! let ctx = StatementContext::new("SELECT * FROM users WHERE id = :id")
//!     .with_sql_object("com.example.UserDao", "findById");
//! collector.collect(1_500_000, &ctx)?;
//! ```

pub mod collector;
pub mod config;
pub mod context;
pub mod strategy;

pub use collector::{InstrumentedTimingCollector, TimingCollector};
pub use config::CollectorConfig;
pub use context::StatementContext;
pub use strategy::{
    BasicSqlNameStrategy, DelegatingNameStrategy, NameRule, ShortNameStrategy, SmartNameStrategy,
    StatementNameStrategy,
};
