//! Statement naming strategies.
//!
//! A [`StatementNameStrategy`] turns a [`StatementContext`] into the
//! [`MetricName`] its timing is recorded under. Strategies never fail: when
//! the context lacks what a strategy prefers, it falls back to a less specific
//! name, and ultimately to `sql:type=unknown`.
//!
//! The provided strategies are ordered lists of [`NameRule`]s evaluated by a
//! [`DelegatingNameStrategy`]. Any `Fn(&StatementContext) -> MetricName` is a
//! strategy too.

mod rules;

use querymeter_core::MetricName;
use tracing::trace;

use crate::context::StatementContext;

pub use rules::{
    empty_sql, for_raw_sql, unknown_sql, NameRule, EMPTY_TYPE, RAW_TYPE, SQL_GROUP, UNKNOWN_TYPE,
};

/// Derives the metric name for a statement.
pub trait StatementNameStrategy: Send + Sync {
    /// Name the statement described by `ctx`.
    fn statement_name(&self, ctx: &StatementContext) -> MetricName;
}

impl<F> StatementNameStrategy for F
where
    F: Fn(&StatementContext) -> MetricName + Send + Sync,
{
    fn statement_name(&self, ctx: &StatementContext) -> MetricName {
        self(ctx)
    }
}

/// Tries each rule in order; the first rule that names the statement wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegatingNameStrategy {
    rules: Vec<NameRule>,
}

impl DelegatingNameStrategy {
    /// Create a strategy from an ordered list of rules.
    pub fn new(rules: Vec<NameRule>) -> Self {
        Self { rules }
    }

    /// The rules, in evaluation order.
    pub fn rules(&self) -> &[NameRule] {
        &self.rules
    }
}

impl StatementNameStrategy for DelegatingNameStrategy {
    fn statement_name(&self, ctx: &StatementContext) -> MetricName {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(ctx))
            .unwrap_or_else(|| {
                trace!(raw_sql = ?ctx.raw_sql(), "no naming rule matched statement");
                unknown_sql()
            })
    }
}

/// Names statements after the code that declared them when that is known,
/// otherwise after the statement text.
///
/// Rules: empty check, context class, context name, declaring object, raw
/// SQL, locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartNameStrategy(DelegatingNameStrategy);

impl SmartNameStrategy {
    pub fn new() -> Self {
        Self(DelegatingNameStrategy::new(vec![
            NameRule::CheckEmpty,
            NameRule::ContextClass,
            NameRule::ContextName,
            NameRule::SqlObject,
            NameRule::CheckRaw,
            NameRule::NaiveName,
        ]))
    }
}

impl Default for SmartNameStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementNameStrategy for SmartNameStrategy {
    fn statement_name(&self, ctx: &StatementContext) -> MetricName {
        self.0.statement_name(ctx)
    }
}

/// Names every statement `sql:type=raw,name=<statement text>`.
///
/// For hosts that cannot, or should not, attribute statements to call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicSqlNameStrategy(DelegatingNameStrategy);

impl BasicSqlNameStrategy {
    pub fn new() -> Self {
        Self(DelegatingNameStrategy::new(vec![
            NameRule::CheckEmpty,
            NameRule::RawSql,
        ]))
    }
}

impl Default for BasicSqlNameStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementNameStrategy for BasicSqlNameStrategy {
    fn statement_name(&self, ctx: &StatementContext) -> MetricName {
        self.0.statement_name(ctx)
    }
}

/// Like [`SmartNameStrategy`], but call-site names drop the owner's namespace
/// and live under a single base group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortNameStrategy(DelegatingNameStrategy);

impl ShortNameStrategy {
    pub fn new(base_name: impl Into<String>) -> Self {
        let base_name = base_name.into();
        Self(DelegatingNameStrategy::new(vec![
            NameRule::CheckEmpty,
            NameRule::ShortContextClass(base_name.clone()),
            NameRule::ContextName,
            NameRule::ShortSqlObject(base_name),
            NameRule::CheckRaw,
            NameRule::NaiveName,
        ]))
    }
}

impl StatementNameStrategy for ShortNameStrategy {
    fn statement_name(&self, ctx: &StatementContext) -> MetricName {
        self.0.statement_name(ctx)
    }
}
