//! Synthetic statement workload.
//!
//! Workers replay a fixed catalogue of statements with random latencies
//! through a shared [`InstrumentedTimingCollector`]. Nothing is executed
//! against a database.

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use querymeter_core::{MetricsError, SharedMetricsRegistry};
use querymeter_sql::context::{STATEMENT_CLASS, STATEMENT_GROUP, STATEMENT_NAME, STATEMENT_TYPE};
use querymeter_sql::{InstrumentedTimingCollector, StatementContext, TimingCollector};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::WorkloadConfig;

/// Workload failures.
#[derive(Debug, Error)]
pub enum WorkloadError {
    /// Recording a statement failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// A worker thread panicked.
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadSummary {
    /// Statements recorded across all workers.
    pub statements: u64,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u128,
}

/// Statements replayed by every worker.
pub fn statement_catalogue() -> Vec<StatementContext> {
    vec![
        StatementContext::new("SELECT * FROM users WHERE id = :id")
            .with_sql_object("my_app::dao::UserDao", "find_by_id"),
        StatementContext::new("INSERT INTO users (id, name) VALUES (:id, :name)")
            .with_sql_object("my_app::dao::UserDao", "insert"),
        StatementContext::new("SELECT count(*) FROM orders WHERE user_id = :user_id")
            .with_attribute(STATEMENT_CLASS, "my_app::reports::OrderReport")
            .with_attribute(STATEMENT_NAME, "count_for_user"),
        StatementContext::new("SELECT sum(total) FROM orders")
            .with_attribute(STATEMENT_GROUP, "my_app.reports")
            .with_attribute(STATEMENT_TYPE, "Revenue")
            .with_attribute(STATEMENT_NAME, "total"),
        StatementContext::new("my_app.dao.AuditDao:purge_expired"),
        StatementContext::new("SELECT 1"),
        StatementContext::empty(),
    ]
}

/// Run the workload against `registry`.
pub fn run(
    config: &WorkloadConfig,
    registry: SharedMetricsRegistry,
) -> Result<WorkloadSummary, WorkloadError> {
    let collector = Arc::new(InstrumentedTimingCollector::with_config(
        registry,
        config.naming_strategy(),
        config.collector,
    ));
    let catalogue = Arc::new(statement_catalogue());
    let (low, high) = config.latency_us;

    info!(
        workers = config.workers,
        iterations = config.iterations,
        strategy = ?config.strategy,
        "starting workload"
    );
    let started = Instant::now();

    let handles: Vec<_> = (0..config.workers)
        .map(|worker| {
            let collector = Arc::clone(&collector);
            let catalogue = Arc::clone(&catalogue);
            let iterations = config.iterations;
            thread::spawn(move || -> Result<u64, MetricsError> {
                let mut rng = rand::thread_rng();
                for i in 0..iterations {
                    let ctx = &catalogue[(worker + i) % catalogue.len()];
                    let elapsed_ns = rng.gen_range(low..=high).saturating_mul(1_000);
                    collector.collect(elapsed_ns, ctx)?;
                }
                debug!(worker, "worker finished");
                Ok(iterations as u64)
            })
        })
        .collect();

    let mut statements = 0;
    for (worker, handle) in handles.into_iter().enumerate() {
        statements += handle
            .join()
            .map_err(|_| WorkloadError::WorkerPanicked(worker))??;
    }

    let summary = WorkloadSummary {
        statements,
        elapsed_ms: started.elapsed().as_millis(),
    };
    info!(
        statements = summary.statements,
        elapsed_ms = summary.elapsed_ms as u64,
        metrics = collector.registry().len(),
        "workload finished"
    );
    Ok(summary)
}
