//! Output formatters for registry snapshots.

use std::collections::BTreeMap;

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use querymeter_core::{MetricName, MetricSnapshot, RegisteredMetric};
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Metrics grouped by [`MetricName::group`].
pub type GroupedMetrics = BTreeMap<String, BTreeMap<MetricName, RegisteredMetric>>;

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a grouped registry snapshot.
    fn format_metrics(&self, metrics: &GroupedMetrics) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_metrics(&self, metrics: &GroupedMetrics) -> String {
        if metrics.is_empty() {
            return "(no metrics)".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec![
            "group", "type", "scope", "name", "kind", "count", "mean", "p99", "max", "rate",
        ]);

        for (name, metric) in metrics.values().flat_map(|group| group.iter()) {
            let mut row = vec![
                Cell::new(name.group()),
                Cell::new(name.type_name()),
                Cell::new(name.scope().unwrap_or("-")),
                Cell::new(name.name()),
                Cell::new(metric.kind()),
            ];
            row.extend(value_cells(&metric.snapshot()).into_iter().map(Cell::new));
            table.add_row(row);
        }

        table.to_string()
    }
}

fn value_cells(snapshot: &MetricSnapshot) -> [String; 5] {
    match snapshot {
        MetricSnapshot::Counter { count } => {
            [count.to_string(), "-".into(), "-".into(), "-".into(), "-".into()]
        }
        MetricSnapshot::Histogram(h) => [
            h.count.to_string(),
            format!("{:.2}", h.mean),
            h.p99.to_string(),
            h.max.to_string(),
            "-".into(),
        ],
        MetricSnapshot::Meter {
            event_type,
            count,
            mean_rate,
        } => [
            count.to_string(),
            "-".into(),
            "-".into(),
            "-".into(),
            format!("{mean_rate:.2} {event_type}"),
        ],
        MetricSnapshot::Timer(t) => [
            t.count.to_string(),
            format!("{:.3} {}", t.mean, t.duration_unit),
            format!("{:.3}", t.p99),
            format!("{:.3}", t.max),
            format!("{:.2}/{}", t.mean_rate, t.rate_unit),
        ],
    }
}

/// JSON formatter.
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonMetric<'a> {
    name: &'a MetricName,
    #[serde(rename = "type")]
    type_name: &'a str,
    scope: Option<&'a str>,
    metric: MetricSnapshot,
}

impl Formatter for JsonFormatter {
    fn format_metrics(&self, metrics: &GroupedMetrics) -> String {
        let grouped: BTreeMap<&str, Vec<JsonMetric<'_>>> = metrics
            .iter()
            .map(|(group, entries)| {
                let entries = entries
                    .iter()
                    .map(|(name, metric)| JsonMetric {
                        name,
                        type_name: name.type_name(),
                        scope: name.scope(),
                        metric: metric.snapshot(),
                    })
                    .collect();
                (group.as_str(), entries)
            })
            .collect();

        serde_json::to_string_pretty(&grouped)
            .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }
}
