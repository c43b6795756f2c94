//! Metric identities.
//!
//! A [`MetricName`] identifies one metric by its owning group, type, name and
//! optional scope. Every name carries a canonical string (the "mbean name")
//! which is what equality, hashing and ordering use and what exporters show:
//!
//! ```text
//! <group>:type=<type>[,scope=<scope>][,name=<name>]
//! ```
//!
//! The scope segment is present only when a scope was supplied, and the name
//! segment only when the name is non-empty. Values are not escaped.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::{MetricsError, Result};

/// Separator between path segments in a Rust owner path.
const RUST_PATH_SEPARATOR: &str = "::";

/// Marker left on generated/anonymous owner names.
const ANONYMOUS_MARKER: char = '$';

/// Identity of a metric.
///
/// Two names are equal if and only if their canonical strings are equal,
/// even when their components differ (see [`MetricName::with_mbean_name`]).
#[derive(Debug, Clone)]
pub struct MetricName {
    group: String,
    type_name: String,
    name: String,
    scope: Option<String>,
    mbean_name: String,
}

impl MetricName {
    /// Create a name without a scope.
    pub fn new(
        group: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::from_parts(group.into(), type_name.into(), name.into(), None)
    }

    /// Create a scoped name.
    pub fn with_scope(
        group: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self::from_parts(
            group.into(),
            type_name.into(),
            name.into(),
            Some(scope.into()),
        )
    }

    /// Create a name whose canonical string is supplied by the caller.
    ///
    /// The string is used verbatim and becomes the only thing equality and
    /// ordering look at. Used for names minted by another naming scheme.
    pub fn with_mbean_name(
        group: impl Into<String>,
        type_name: impl Into<String>,
        name: impl Into<String>,
        scope: Option<String>,
        mbean_name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            type_name: type_name.into(),
            name: name.into(),
            scope,
            mbean_name: mbean_name.into(),
        }
    }

    /// Start building a name whose components may be missing.
    pub fn builder() -> MetricNameBuilder {
        MetricNameBuilder::default()
    }

    /// Create a name owned by the type at `owner`.
    ///
    /// `owner` is a path such as `my_crate::db::UserDao` or
    /// `com.example.UserDao`. The group is everything before the last segment
    /// (with `::` rendered as `.`), or empty when there is no namespace. The
    /// type is the last segment without generic arguments or trailing `$`
    /// markers.
    pub fn from_owner(owner: &str, name: impl Into<String>, scope: Option<&str>) -> Self {
        let (group, type_name) = split_owner(owner);
        Self::from_parts(group, type_name, name.into(), scope.map(str::to_string))
    }

    /// Create a name owned by the Rust type `T`.
    pub fn for_type<T: ?Sized>(name: impl Into<String>, scope: Option<&str>) -> Self {
        Self::from_owner(std::any::type_name::<T>(), name, scope)
    }

    fn from_parts(group: String, type_name: String, name: String, scope: Option<String>) -> Self {
        let mbean_name = create_mbean_name(&group, &type_name, &name, scope.as_deref());
        Self {
            group,
            type_name,
            name,
            scope,
            mbean_name,
        }
    }

    /// Group the metric belongs to. For owner-derived names this is the
    /// owner's namespace.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Type the metric belongs to. For owner-derived names this is the
    /// owner's simple name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Bare name of the metric.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope of the metric, if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Whether the metric has a scope.
    pub fn has_scope(&self) -> bool {
        self.scope.is_some()
    }

    /// Canonical string identifying the metric.
    pub fn mbean_name(&self) -> &str {
        &self.mbean_name
    }
}

impl PartialEq for MetricName {
    fn eq(&self, other: &Self) -> bool {
        self.mbean_name == other.mbean_name
    }
}

impl Eq for MetricName {}

impl Hash for MetricName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.mbean_name.hash(state);
    }
}

impl PartialOrd for MetricName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetricName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.mbean_name.cmp(&other.mbean_name)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mbean_name)
    }
}

impl Serialize for MetricName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.mbean_name)
    }
}

/// Builder for names assembled from optional parts.
///
/// [`build`](MetricNameBuilder::build) fails with
/// [`MetricsError::InvalidIdentity`] if the group, type or name was never set.
#[derive(Debug, Clone, Default)]
pub struct MetricNameBuilder {
    group: Option<String>,
    type_name: Option<String>,
    name: Option<String>,
    scope: Option<String>,
    mbean_name: Option<String>,
}

impl MetricNameBuilder {
    /// Set the group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the type.
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Override the canonical string.
    pub fn mbean_name(mut self, mbean_name: impl Into<String>) -> Self {
        self.mbean_name = Some(mbean_name.into());
        self
    }

    /// Validate the parts and build the name.
    pub fn build(self) -> Result<MetricName> {
        let (Some(group), Some(type_name)) = (self.group, self.type_name) else {
            return Err(MetricsError::InvalidIdentity(
                "Both group and type need to be specified".to_string(),
            ));
        };
        let Some(name) = self.name else {
            return Err(MetricsError::InvalidIdentity(
                "Name needs to be specified".to_string(),
            ));
        };

        Ok(match self.mbean_name {
            Some(mbean_name) => {
                MetricName::with_mbean_name(group, type_name, name, self.scope, mbean_name)
            }
            None => MetricName::from_parts(group, type_name, name, self.scope),
        })
    }
}

/// Build the canonical string for the given parts.
pub fn create_mbean_name(group: &str, type_name: &str, name: &str, scope: Option<&str>) -> String {
    let mut mbean_name = String::with_capacity(
        group.len() + type_name.len() + name.len() + scope.map_or(0, str::len) + 19,
    );
    mbean_name.push_str(group);
    mbean_name.push_str(":type=");
    mbean_name.push_str(type_name);
    if let Some(scope) = scope {
        mbean_name.push_str(",scope=");
        mbean_name.push_str(scope);
    }
    if !name.is_empty() {
        mbean_name.push_str(",name=");
        mbean_name.push_str(name);
    }
    mbean_name
}

/// Split an owner path into `(group, simple type name)`.
pub fn split_owner(owner: &str) -> (String, String) {
    // Generic arguments may themselves contain paths.
    let path = owner.split('<').next().unwrap_or(owner);

    let (namespace, simple) = match (path.rfind(RUST_PATH_SEPARATOR), path.rfind('.')) {
        (Some(rust), Some(dot)) if dot > rust => (&path[..dot], &path[dot + 1..]),
        (Some(rust), _) => (&path[..rust], &path[rust + RUST_PATH_SEPARATOR.len()..]),
        (None, Some(dot)) => (&path[..dot], &path[dot + 1..]),
        (None, None) => ("", path),
    };

    (
        namespace.replace(RUST_PATH_SEPARATOR, "."),
        simple.trim_end_matches(ANONYMOUS_MARKER).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::BTreeSet;

    fn hash_of(name: &MetricName) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_mbean_name_without_scope() {
        let name = MetricName::new("com.example", "Worker", "requests");
        assert_eq!(name.mbean_name(), "com.example:type=Worker,name=requests");
        assert_eq!(name.to_string(), "com.example:type=Worker,name=requests");
        assert!(!name.has_scope());
    }

    #[test]
    fn test_mbean_name_with_scope() {
        let name = MetricName::with_scope("com.example", "Worker", "requests", "read");
        assert_eq!(
            name.mbean_name(),
            "com.example:type=Worker,scope=read,name=requests"
        );
        assert!(name.has_scope());
        assert_eq!(name.scope(), Some("read"));
    }

    #[test]
    fn test_empty_name_omits_segment() {
        let name = MetricName::new("com.example", "Worker", "");
        assert_eq!(name.mbean_name(), "com.example:type=Worker");

        let scoped = MetricName::with_scope("com.example", "Worker", "", "read");
        assert_eq!(scoped.mbean_name(), "com.example:type=Worker,scope=read");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let name = MetricName::new("sql", "raw", "SELECT a, b FROM t WHERE x = :y");
        assert_eq!(
            name.mbean_name(),
            "sql:type=raw,name=SELECT a, b FROM t WHERE x = :y"
        );

        let padded = MetricName::new(" g ", " T ", " n ");
        assert_eq!(padded.mbean_name(), " g :type= T ,name= n ");
    }

    #[test]
    fn test_equal_names_hash_equal() {
        let a = MetricName::with_scope("g", "T", "n", "s");
        let b = MetricName::with_scope("g", "T", "n", "s");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let c = MetricName::with_scope("g", "T", "n", "other");
        assert_ne!(a, c);
        assert_ne!(a, MetricName::new("g", "T", "n"));
    }

    #[test]
    fn test_coinciding_mbean_names_are_equal() {
        // No escaping means different parts can produce the same string.
        let a = MetricName::new("g", "T", "n");
        let b = MetricName::new("g", "T,name=n", "");
        assert_eq!(a, b);
        assert_ne!(a.type_name(), b.type_name());
    }

    #[test]
    fn test_explicit_mbean_name_is_identity() {
        let a = MetricName::with_mbean_name("g", "T", "n", None, "custom:name=x");
        let b = MetricName::with_mbean_name("other", "U", "m", Some("s".into()), "custom:name=x");

        assert_eq!(a.mbean_name(), "custom:name=x");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, MetricName::new("g", "T", "n"));
        assert_eq!(a.group(), "g");
        assert_eq!(b.scope(), Some("s"));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let names: BTreeSet<MetricName> = [
            MetricName::new("b", "T", "x"),
            MetricName::new("a", "U", "y"),
            MetricName::new("a", "T", "z"),
            MetricName::new("a", "T", ""),
        ]
        .into_iter()
        .collect();

        let ordered: Vec<&str> = names.iter().map(MetricName::mbean_name).collect();
        assert_eq!(
            ordered,
            vec!["a:type=T", "a:type=T,name=z", "a:type=U,name=y", "b:type=T,name=x"]
        );
    }

    #[test]
    fn test_builder_requires_group_and_type() {
        let err = MetricName::builder().type_name("T").name("n").build().unwrap_err();
        assert!(matches!(err, MetricsError::InvalidIdentity(_)));
        assert!(err.to_string().contains("group and type"));

        let err = MetricName::builder().group("g").name("n").build().unwrap_err();
        assert!(matches!(err, MetricsError::InvalidIdentity(_)));
    }

    #[test]
    fn test_builder_requires_name() {
        let err = MetricName::builder().group("g").type_name("T").build().unwrap_err();
        assert!(matches!(err, MetricsError::InvalidIdentity(_)));
        assert!(err.to_string().contains("Name needs to be specified"));
    }

    #[test]
    fn test_builder_without_scope() {
        let name = MetricName::builder()
            .group("g")
            .type_name("T")
            .name("n")
            .build()
            .unwrap();
        assert_eq!(name, MetricName::new("g", "T", "n"));
        assert!(!name.has_scope());
    }

    #[test]
    fn test_builder_with_scope_and_override() {
        let scoped = MetricName::builder()
            .group("g")
            .type_name("T")
            .name("n")
            .scope("s")
            .build()
            .unwrap();
        assert_eq!(scoped.mbean_name(), "g:type=T,scope=s,name=n");

        let overridden = MetricName::builder()
            .group("g")
            .type_name("T")
            .name("n")
            .mbean_name("elsewhere:type=X")
            .build()
            .unwrap();
        assert_eq!(overridden.mbean_name(), "elsewhere:type=X");
    }

    #[test]
    fn test_from_owner_dotted_path() {
        let name = MetricName::from_owner("com.example.UserDao", "findById", None);
        assert_eq!(name.group(), "com.example");
        assert_eq!(name.type_name(), "UserDao");
        assert_eq!(name.mbean_name(), "com.example:type=UserDao,name=findById");
    }

    #[test]
    fn test_from_owner_rust_path() {
        let name = MetricName::from_owner("my_app::db::UserDao", "find", Some("primary"));
        assert_eq!(name.group(), "my_app.db");
        assert_eq!(name.type_name(), "UserDao");
        assert_eq!(name.mbean_name(), "my_app.db:type=UserDao,scope=primary,name=find");
    }

    #[test]
    fn test_split_owner_uses_last_separator() {
        assert_eq!(
            split_owner("my_app::dao::UserDao"),
            ("my_app.dao".to_string(), "UserDao".to_string())
        );
        assert_eq!(
            split_owner("com.example::UserDao"),
            ("com.example".to_string(), "UserDao".to_string())
        );
        assert_eq!(
            split_owner("my_app::v1.UserDao"),
            ("my_app.v1".to_string(), "UserDao".to_string())
        );
    }

    #[test]
    fn test_from_owner_without_namespace() {
        let name = MetricName::from_owner("Worker", "requests", None);
        assert_eq!(name.group(), "");
        assert_eq!(name.mbean_name(), ":type=Worker,name=requests");
    }

    #[test]
    fn test_from_owner_strips_anonymous_markers_and_generics() {
        let name = MetricName::from_owner("com.example.Handler$$", "calls", None);
        assert_eq!(name.type_name(), "Handler");

        let name = MetricName::from_owner("alloc::vec::Vec<core::option::Option<u8>>", "len", None);
        assert_eq!(name.group(), "alloc.vec");
        assert_eq!(name.type_name(), "Vec");
    }

    #[test]
    fn test_for_type() {
        struct Worker;

        let name = MetricName::for_type::<Worker>("requests", None);
        assert_eq!(name.type_name(), "Worker");
        assert!(name.group().starts_with("querymeter_core.name"));
        assert!(name.mbean_name().ends_with(":type=Worker,name=requests"));
    }

    #[test]
    fn test_serialize_as_mbean_name() {
        let name = MetricName::with_scope("g", "T", "n", "s");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"g:type=T,scope=s,name=n\"");
    }
}
