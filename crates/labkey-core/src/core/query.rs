//! Translation of caller-facing columns and filters into native query parameters.

use crate::core::aliases::AliasMap;
use crate::core::filters::{FilterKey, FilterSpec};
use crate::error::ValidationError;
use indexmap::IndexMap;

pub const SCHEMA_NAME_PARAM: &str = "schemaName";
pub const QUERY_NAME_PARAM: &str = "query.queryName";
pub const COLUMNS_PARAM: &str = "query.columns";

/// The exact parameter set sent to `selectRows.api`, in send order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeRequest {
    params: Vec<(String, String)>,
}

impl NativeRequest {
    pub fn build(
        schema: &str,
        query_name: &str,
        columns: &[String],
        aliases: &AliasMap,
        filters: &FilterSpec,
    ) -> Result<Self, ValidationError> {
        let native_columns: Vec<&str> = columns.iter().map(|c| aliases.to_native(c)).collect();

        let mut params = vec![
            (SCHEMA_NAME_PARAM.to_string(), schema.to_string()),
            (QUERY_NAME_PARAM.to_string(), query_name.to_string()),
            (COLUMNS_PARAM.to_string(), native_columns.join(",")),
        ];

        // Two caller keys can land on one native parameter; the later value wins.
        let mut filter_params: IndexMap<String, String> = IndexMap::with_capacity(filters.len());
        for (key, value) in filters.iter() {
            let filter = FilterKey::parse(key)?;
            let name = format!(
                "query.{}~{}",
                aliases.to_native(filter.column),
                filter.operator
            );
            filter_params.insert(name, value.to_string());
        }
        params.extend(filter_params);

        Ok(Self { params })
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
