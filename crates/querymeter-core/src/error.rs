//! Core error types.

use thiserror::Error;

use crate::metrics::MetricKind;
use crate::name::MetricName;

/// Errors raised while naming or registering metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric name was built without a required component.
    #[error("invalid metric name: {0}")]
    InvalidIdentity(String),

    /// A metric name is already bound to a metric of another kind.
    #[error("metric {name} is already registered as a {existing}, not a {requested}")]
    KindMismatch {
        /// Name shared by both registrations.
        name: MetricName,
        /// Kind of the live metric.
        existing: MetricKind,
        /// Kind the caller asked for.
        requested: MetricKind,
    },
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MetricsError::InvalidIdentity("Name needs to be specified".to_string());
        assert!(err.to_string().contains("Name needs to be specified"));

        let err = MetricsError::KindMismatch {
            name: MetricName::new("com.example", "Worker", "requests"),
            existing: MetricKind::Timer,
            requested: MetricKind::Counter,
        };
        let message = err.to_string();
        assert!(message.contains("com.example:type=Worker,name=requests"));
        assert!(message.contains("timer"));
        assert!(message.contains("counter"));
    }
}
