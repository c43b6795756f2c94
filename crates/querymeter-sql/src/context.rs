//! Statement execution context.

use std::collections::HashMap;

/// Attribute holding the metric group for a statement.
pub const STATEMENT_GROUP: &str = "statement.group";
/// Attribute holding the metric type for a statement.
pub const STATEMENT_TYPE: &str = "statement.type";
/// Attribute holding the fully-qualified owner path for a statement.
pub const STATEMENT_CLASS: &str = "statement.class";
/// Attribute holding the metric name for a statement.
pub const STATEMENT_NAME: &str = "statement.name";

/// Snapshot of what the host framework knows about a statement being executed.
///
/// Everything is optional; naming strategies fall back to whatever is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementContext {
    raw_sql: Option<String>,
    rewritten_sql: Option<String>,
    sql_object_type: Option<String>,
    sql_object_method: Option<String>,
    attributes: HashMap<String, String>,
}

impl StatementContext {
    /// Create a context for the given statement text.
    pub fn new(raw_sql: impl Into<String>) -> Self {
        Self {
            raw_sql: Some(raw_sql.into()),
            ..Default::default()
        }
    }

    /// Create a context that carries no statement text.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the statement text after the framework rewrote it.
    pub fn with_rewritten_sql(mut self, sql: impl Into<String>) -> Self {
        self.rewritten_sql = Some(sql.into());
        self
    }

    /// Set the declaring owner (as a path such as `my_app::dao::UserDao`) and method.
    pub fn with_sql_object(mut self, owner: impl Into<String>, method: impl Into<String>) -> Self {
        self.sql_object_type = Some(owner.into());
        self.sql_object_method = Some(method.into());
        self
    }

    /// Set the declaring owner to the Rust type `T`.
    pub fn with_sql_object_type<T: ?Sized>(self, method: impl Into<String>) -> Self {
        self.with_sql_object(std::any::type_name::<T>(), method)
    }

    /// Set a free-form attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Statement text as written by the caller.
    pub fn raw_sql(&self) -> Option<&str> {
        self.raw_sql.as_deref()
    }

    /// Statement text as sent to the database.
    pub fn rewritten_sql(&self) -> Option<&str> {
        self.rewritten_sql.as_deref()
    }

    /// Path of the type that declared the statement.
    pub fn sql_object_type(&self) -> Option<&str> {
        self.sql_object_type.as_deref()
    }

    /// Method that declared the statement.
    pub fn sql_object_method(&self) -> Option<&str> {
        self.sql_object_method.as_deref()
    }

    /// Attribute value by key.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
