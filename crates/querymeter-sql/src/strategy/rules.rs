//! Partial naming rules.
//!
//! Each [`NameRule`] either names a statement or declines, leaving the
//! decision to the next rule in a [`DelegatingNameStrategy`](super::DelegatingNameStrategy).

use querymeter_core::name::split_owner;
use querymeter_core::MetricName;

use crate::context::{
    StatementContext, STATEMENT_CLASS, STATEMENT_GROUP, STATEMENT_NAME, STATEMENT_TYPE,
};

/// Group used for names derived from statement text alone.
pub const SQL_GROUP: &str = "sql";
/// Type used for statements without text.
pub const EMPTY_TYPE: &str = "empty";
/// Type used for names carrying the raw statement text.
pub const RAW_TYPE: &str = "raw";
/// Type used when no rule could name a statement.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Name for statements without text.
pub fn empty_sql() -> MetricName {
    MetricName::new(SQL_GROUP, EMPTY_TYPE, "")
}

/// Name for statements no rule could name.
pub fn unknown_sql() -> MetricName {
    MetricName::new(SQL_GROUP, UNKNOWN_TYPE, "")
}

/// Name carrying the statement text verbatim.
pub fn for_raw_sql(sql: &str) -> MetricName {
    MetricName::new(SQL_GROUP, RAW_TYPE, sql)
}

/// One step of a naming strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRule {
    /// Missing or empty statement text names the statement `sql:type=empty`.
    CheckEmpty,
    /// [`STATEMENT_CLASS`] and [`STATEMENT_NAME`] attributes name the
    /// statement after the owner path and the given name.
    ContextClass,
    /// [`STATEMENT_GROUP`], [`STATEMENT_TYPE`] and [`STATEMENT_NAME`]
    /// attributes name the statement explicitly.
    ContextName,
    /// The declaring owner and method name the statement.
    SqlObject,
    /// Statement text containing whitespace is literal SQL and is named
    /// `sql:type=raw,name=<text>`.
    CheckRaw,
    /// Statement text of the form `owner:name` (a locator rather than SQL)
    /// names the statement after the owner; other text is named as raw SQL.
    NaiveName,
    /// Any statement text is named `sql:type=raw,name=<text>`.
    RawSql,
    /// Like [`ContextClass`](NameRule::ContextClass) but collapses the owner
    /// to its simple name under the given group.
    ShortContextClass(String),
    /// Like [`SqlObject`](NameRule::SqlObject) but collapses the owner to its
    /// simple name under the given group.
    ShortSqlObject(String),
}

impl NameRule {
    /// Name the statement, or `None` if this rule does not apply.
    pub fn apply(&self, ctx: &StatementContext) -> Option<MetricName> {
        match self {
            NameRule::CheckEmpty => match ctx.raw_sql() {
                None | Some("") => Some(empty_sql()),
                Some(_) => None,
            },
            NameRule::ContextClass => {
                let class = ctx.attribute(STATEMENT_CLASS)?;
                let name = ctx.attribute(STATEMENT_NAME)?;
                Some(MetricName::from_owner(class, name, None))
            }
            NameRule::ContextName => {
                let group = ctx.attribute(STATEMENT_GROUP)?;
                let type_name = ctx.attribute(STATEMENT_TYPE)?;
                let name = ctx.attribute(STATEMENT_NAME)?;
                Some(MetricName::new(group, type_name, name))
            }
            NameRule::SqlObject => {
                let owner = ctx.sql_object_type()?;
                let method = ctx.sql_object_method()?;
                Some(MetricName::from_owner(owner, method, None))
            }
            NameRule::CheckRaw => {
                let sql = ctx.raw_sql()?;
                sql.contains(char::is_whitespace).then(|| for_raw_sql(sql))
            }
            NameRule::NaiveName => {
                let sql = ctx.raw_sql()?;
                Some(match split_locator(sql) {
                    Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                        MetricName::from_owner(owner, name, None)
                    }
                    _ => for_raw_sql(sql),
                })
            }
            NameRule::RawSql => ctx.raw_sql().map(for_raw_sql),
            NameRule::ShortContextClass(base) => {
                let class = ctx.attribute(STATEMENT_CLASS)?;
                let name = ctx.attribute(STATEMENT_NAME)?;
                Some(short_name(base, class, name))
            }
            NameRule::ShortSqlObject(base) => {
                let owner = ctx.sql_object_type()?;
                let method = ctx.sql_object_method()?;
                Some(short_name(base, owner, method))
            }
        }
    }
}

/// Split `owner:name` at the last colon that is not part of a `::` path
/// separator.
fn split_locator(sql: &str) -> Option<(&str, &str)> {
    let bytes = sql.as_bytes();
    sql.char_indices()
        .rev()
        .filter(|&(_, c)| c == ':')
        .map(|(i, _)| i)
        .find(|&i| {
            let joined_before = i > 0 && bytes[i - 1] == b':';
            let joined_after = bytes.get(i + 1) == Some(&b':');
            !joined_before && !joined_after
        })
        .map(|i| (&sql[..i], &sql[i + 1..]))
}

fn short_name(base: &str, owner: &str, name: &str) -> MetricName {
    let (_, simple) = split_owner(owner);
    MetricName::new(base, simple, name)
}
