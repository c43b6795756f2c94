//! Integration tests for statement timing collection.

use std::sync::{Arc, Barrier};

use querymeter_core::{new_shared_registry, MetricKind, MetricName, RegisteredMetric};
use querymeter_sql::{
    BasicSqlNameStrategy, InstrumentedTimingCollector, ShortNameStrategy, StatementContext,
    TimingCollector,
};

#[test]
fn test_basic_strategy_end_to_end() {
    let registry = new_shared_registry();
    let collector = InstrumentedTimingCollector::with_strategy(
        Arc::clone(&registry),
        BasicSqlNameStrategy::new(),
    );
    let ctx = StatementContext::new("SELECT 1");

    collector.collect(1_500_000, &ctx).unwrap();
    collector.collect(1_500_000, &ctx).unwrap();

    let metrics = registry.all_metrics();
    assert_eq!(metrics.len(), 1);

    let (name, metric) = &metrics[0];
    assert_eq!(name.mbean_name(), "sql:type=raw,name=SELECT 1");
    match metric {
        RegisteredMetric::Timer(timer) => {
            assert_eq!(timer.count(), 2);
            assert!((timer.mean() - 1.5).abs() < 1e-9);
        }
        other => panic!("expected a timer, found a {}", other.kind()),
    }
}

#[test]
fn test_concurrent_collection_shares_timers() {
    const WORKERS: usize = 8;
    const STATEMENTS_PER_WORKER: u64 = 250;

    let registry = new_shared_registry();
    let collector = Arc::new(InstrumentedTimingCollector::new(Arc::clone(&registry)));
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let collector = Arc::clone(&collector);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                let find = StatementContext::new("SELECT * FROM users WHERE id = :id")
                    .with_sql_object("com.example.dao.UserDao", "findById");
                let insert = StatementContext::new("INSERT INTO audit (worker) VALUES (:worker)");
                barrier.wait();
                for i in 0..STATEMENTS_PER_WORKER {
                    collector.collect(1_000 * (i + 1), &find).unwrap();
                    if worker % 2 == 0 {
                        collector.collect(500, &insert).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 2);

    let find = registry
        .get(&MetricName::new("com.example.dao", "UserDao", "findById"))
        .unwrap();
    let insert = registry
        .get(&MetricName::new(
            "sql",
            "raw",
            "INSERT INTO audit (worker) VALUES (:worker)",
        ))
        .unwrap();

    match (find, insert) {
        (RegisteredMetric::Timer(find), RegisteredMetric::Timer(insert)) => {
            assert_eq!(find.count(), WORKERS as u64 * STATEMENTS_PER_WORKER);
            assert_eq!(insert.count(), (WORKERS as u64 / 2) * STATEMENTS_PER_WORKER);
        }
        _ => panic!("expected timers"),
    }
}

#[test]
fn test_grouped_by_strategy_base() {
    let registry = new_shared_registry();
    let collector = InstrumentedTimingCollector::with_strategy(
        Arc::clone(&registry),
        ShortNameStrategy::new("db"),
    );

    collector
        .collect(
            1_000,
            &StatementContext::new("SELECT 1").with_sql_object("my_app::dao::UserDao", "ping"),
        )
        .unwrap();
    collector
        .collect(
            1_000,
            &StatementContext::new("SELECT 2").with_sql_object("my_app::dao::OrderDao", "ping"),
        )
        .unwrap();
    collector
        .collect(1_000, &StatementContext::new("SELECT 3"))
        .unwrap();

    let grouped = registry.grouped_metrics();
    assert_eq!(grouped["db"].len(), 2);
    assert_eq!(grouped["sql"].len(), 1);
    assert!(grouped
        .values()
        .flat_map(|metrics| metrics.values())
        .all(|metric| metric.kind() == MetricKind::Timer));
}

#[test]
fn test_custom_strategy_without_adapter_changes() {
    let registry = new_shared_registry();
    let collector = InstrumentedTimingCollector::with_strategy(
        Arc::clone(&registry),
        |ctx: &StatementContext| {
            let verb = ctx
                .raw_sql()
                .and_then(|sql| sql.split_whitespace().next())
                .unwrap_or("unknown")
                .to_ascii_lowercase();
            MetricName::with_scope("sql", "Statements", verb, "primary")
        },
    );

    collector
        .collect(1_000, &StatementContext::new("SELECT 1"))
        .unwrap();
    collector
        .collect(1_000, &StatementContext::new("select 2"))
        .unwrap();
    collector
        .collect(1_000, &StatementContext::new("UPDATE t SET x = 1"))
        .unwrap();

    let names: Vec<String> = registry
        .all_metrics()
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "sql:type=Statements,scope=primary,name=select",
            "sql:type=Statements,scope=primary,name=update",
        ]
    );
}
