//! Result tables and the reshaping applied to raw `selectRows` rows.

use crate::core::aliases::AliasMap;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{Map, Value};

/// One result row. Key order always equals [`ResultTable::columns`].
pub type Row = IndexMap<String, Value>;

/// Every non-`rows` field of a `selectRows` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseMetadata(Map<String, Value>);

impl ResponseMetadata {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Total number of matching rows as reported by the server
    pub fn row_count(&self) -> Option<u64> {
        self.0.get("rowCount").and_then(Value::as_u64)
    }

    pub fn query_name(&self) -> Option<&str> {
        self.0.get("queryName").and_then(Value::as_str)
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.0.get("schemaName").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    metadata: ResponseMetadata,
}

impl ResultTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        if !self.columns.iter().any(|c| c == name) {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(name).unwrap_or(&Value::Null))
                .collect(),
        )
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Row>, ResponseMetadata) {
        (self.columns, self.rows, self.metadata)
    }
}

/// The relabelling, injection and projection rules of one instance.
#[derive(Debug, Clone, Copy)]
pub struct TableShape<'a> {
    pub aliases: &'a AliasMap,
    pub custom_columns: &'a IndexMap<String, Value>,
    pub column_order: &'a [String],
    pub columns: &'a [String],
}

impl TableShape<'_> {
    /// Rename native columns, inject constant columns, then project to
    /// `column_order ∩ present` followed by `columns ∩ present \ column_order`.
    pub fn apply(&self, rows: Vec<Map<String, Value>>, metadata: ResponseMetadata) -> ResultTable {
        let mut present: IndexSet<String> = IndexSet::new();

        let mut renamed: Vec<Row> = rows
            .into_iter()
            .map(|row| {
                let mut out = Row::with_capacity(row.len() + self.custom_columns.len());
                for (name, value) in row {
                    let caller = self.aliases.to_caller(&name).to_string();
                    present.insert(caller.clone());
                    out.insert(caller, value);
                }
                out
            })
            .collect();

        for (name, value) in self.custom_columns {
            present.insert(name.clone());
            for row in &mut renamed {
                row.insert(name.clone(), value.clone());
            }
        }

        let projection = self.projection(&present);

        let rows: Vec<Row> = renamed
            .into_iter()
            .map(|mut row| {
                projection
                    .iter()
                    .map(|name| {
                        let value = row.swap_remove(name).unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect::<Row>()
            })
            .collect();

        ResultTable {
            columns: projection,
            rows,
            metadata,
        }
    }

    fn projection(&self, present: &IndexSet<String>) -> Vec<String> {
        let mut placed: IndexSet<&str> = IndexSet::new();

        for name in self.column_order {
            if present.contains(name) {
                placed.insert(name);
            }
        }
        for name in self.columns {
            if present.contains(name) && !self.column_order.contains(name) {
                placed.insert(name);
            }
        }

        placed.into_iter().map(str::to_string).collect()
    }
}
