use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Everything needed to talk to one LabKey server.
#[derive(Clone, PartialEq, Serialize)]
pub struct InstanceConfig {
    pub host: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub project: String,
    pub schema: String,
    pub query_name: String,
    /// Caller-facing column names to request
    pub columns: Vec<String>,
    /// Caller-facing name -> server-native name
    pub aliases: IndexMap<String, String>,
    /// Constant columns added to every result row
    pub custom_columns: IndexMap<String, Value>,
    /// Priority columns, placed before the remaining requested columns
    pub column_order: Vec<String>,
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("host", &self.host)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("project", &self.project)
            .field("schema", &self.schema)
            .field("query_name", &self.query_name)
            .field("columns", &self.columns)
            .field("aliases", &self.aliases)
            .field("custom_columns", &self.custom_columns)
            .field("column_order", &self.column_order)
            .finish()
    }
}
