//! Instance registry: turns a layered config document into one
//! [`InstanceConfig`] per configured server.

use crate::api::client::LabKeyClient;
use crate::core::aliases::AliasMap;
use crate::core::instance::InstanceConfig;
use crate::error::ConfigError;
use crate::storage::config::ConfigDocument;
use crate::utils::template::{TemplateError, env_lookup, substitute};
use crate::utils::validation::{validate_host, validate_not_empty};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::PathBuf;

const REQUIRED_FIELDS: [&str; 6] = ["host", "email", "password", "project", "schema", "query_name"];

#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    configs: Vec<InstanceConfig>,
}

impl InstanceRegistry {
    /// Load a config file and resolve it against the process environment.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let document = ConfigDocument::load(path)?;
        Self::from_document(&document)
    }

    pub fn from_document(document: &ConfigDocument) -> crate::Result<Self> {
        Self::from_document_with_env(document, env_lookup)
    }

    /// Resolve every server entry, in input order, using `lookup` for
    /// `${NAME}` references in `email` and `password`.
    pub fn from_document_with_env<F>(document: &ConfigDocument, lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut configs = Vec::with_capacity(document.servers.len());

        for (index, server) in document.servers.iter().enumerate() {
            let config = resolve_server(&document.default, server, index, &lookup)?;
            AliasMap::new(config.aliases.clone())?;
            log::debug!(
                "Resolved server {} ({} / {}.{})",
                index,
                config.host,
                config.schema,
                config.query_name
            );
            configs.push(config);
        }

        Ok(Self { configs })
    }

    pub fn configs(&self) -> &[InstanceConfig] {
        &self.configs
    }

    pub fn get(&self, index: usize) -> Option<&InstanceConfig> {
        self.configs.get(index)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Build one independent client (with its own session) per instance.
    pub fn into_clients(self) -> crate::Result<Vec<LabKeyClient>> {
        self.configs.into_iter().map(LabKeyClient::new).collect()
    }
}

/// Shallow merge: server keys replace default keys wholesale.
pub fn merge(default: &Map<String, Value>, server: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = default.clone();
    for (key, value) in server {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn resolve_server<F>(
    default: &Map<String, Value>,
    server: &Map<String, Value>,
    index: usize,
    lookup: &F,
) -> Result<InstanceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let merged = merge(default, server);

    for field in REQUIRED_FIELDS {
        if merged.get(field).is_none_or(Value::is_null) {
            return Err(ConfigError::MissingField {
                field: field.to_string(),
                server_index: index,
            });
        }
    }

    let host = required_string(&merged, "host", index)?;
    validate_host(&host, index)?;

    let schema = required_string(&merged, "schema", index)?;
    validate_not_empty("schema", &schema, index)?;

    let query_name = required_string(&merged, "query_name", index)?;
    validate_not_empty("query_name", &query_name, index)?;

    let email = credential(&merged, "email", index, lookup)?;
    let password = credential(&merged, "password", index, lookup)?;

    Ok(InstanceConfig {
        host,
        email,
        password,
        project: required_string(&merged, "project", index)?,
        schema,
        query_name,
        columns: optional(&merged, "columns", index)?,
        aliases: optional(&merged, "aliases", index)?,
        custom_columns: optional(&merged, "custom_columns", index)?,
        column_order: optional(&merged, "column_order", index)?,
    })
}

fn required_string(
    merged: &Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<String, ConfigError> {
    match merged.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(ConfigError::MissingField {
            field: field.to_string(),
            server_index: index,
        }),
        Some(other) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            server_index: index,
            reason: format!("expected a string, found {}", other),
        }),
    }
}

fn credential<F>(
    merged: &Map<String, Value>,
    field: &str,
    index: usize,
    lookup: &F,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let template = required_string(merged, field, index)?;
    substitute(&template, lookup).map_err(|e| match e {
        TemplateError::Missing(variable) => ConfigError::UnresolvedVariable {
            field: field.to_string(),
            variable,
            server_index: index,
        },
        TemplateError::InvalidPlaceholder(position) => ConfigError::InvalidPlaceholder {
            field: field.to_string(),
            server_index: index,
            position,
        },
    })
}

fn optional<T>(merged: &Map<String, Value>, field: &str, index: usize) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Default,
{
    match merged.get(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                server_index: index,
                reason: e.to_string(),
            })
        }
    }
}
