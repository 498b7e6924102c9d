use crate::error::ValidationError;
use indexmap::IndexMap;
use serde_json::Value;

/// A parsed `<column>~<operator>` filter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterKey<'a> {
    pub column: &'a str,
    pub operator: &'a str,
}

impl<'a> FilterKey<'a> {
    /// Split on the first `~`. The operator is not interpreted.
    pub fn parse(key: &'a str) -> Result<Self, ValidationError> {
        match key.split_once('~') {
            Some((column, operator)) if !column.is_empty() => Ok(Self { column, operator }),
            _ => Err(ValidationError::InvalidFilterKey {
                key: key.to_string(),
            }),
        }
    }
}

/// Filters for a single query, keyed by `"<caller_column>~<operator>"`.
///
/// ```
/// use labkey_core::core::filters::FilterSpec;
///
/// let filters = FilterSpec::new()
///     .with("gender~eq", "Male")
///     .with("age~lte", 40);
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    entries: IndexMap<String, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.insert(key.into(), value.into().0);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Parse a `key=value` pair as given on a command line.
    pub fn insert_pair(&mut self, pair: &str) -> Result<(), ValidationError> {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ValidationError::InvalidFilterKey {
                key: pair.to_string(),
            })?;
        FilterKey::parse(key)?;
        self.insert(key, value);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A filter value as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterValue(String);

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue(value.to_string())
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue(value.clone())
    }
}

macro_rules! filter_value_from_display {
    ($($t:ty),*) => {
        $(impl From<$t> for FilterValue {
            fn from(value: $t) -> Self {
                FilterValue(value.to_string())
            }
        })*
    };
}

filter_value_from_display!(i32, i64, u32, u64, usize, f64, bool);

impl From<&Value> for FilterValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => FilterValue(s.clone()),
            Value::Null => FilterValue(String::new()),
            other => FilterValue(other.to_string()),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSpec
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = FilterSpec::new();
        for (key, value) in iter {
            spec.insert(key, value);
        }
        spec
    }
}
