//! Configuration document loading
//!
//! A document has an optional `default` mapping and a `servers` sequence:
//!
//! ```yaml
//! default:
//!   email: ${LABKEY_EMAIL}
//!   password: ${LABKEY_PASSWORD}
//!   schema: lists
//! servers:
//!   - host: http://localhost:9004/labkey/
//!     project: home
//!     query_name: Specimens
//! ```
//!
//! YAML is the primary format; files ending in `.toml` are read as TOML.
//! Path priority: explicit path > LABKEY_CONFIG environment variable > ~/.config/labkey/config.yml

use super::Result;
use crate::error::StorageError;
use crate::utils::template::{env_lookup, expand_lenient};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "LABKEY_CONFIG";

/// A parsed, not yet resolved, configuration document.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub default: Map<String, Value>,
    pub servers: Vec<Map<String, Value>>,
}

// `default:` with no body parses as null in YAML
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConfigDocument {
    /// Load a document; `$VAR` references in the path itself are expanded
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p),
            None => Self::config_file_path()?,
        };

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        if Self::is_toml(&config_path) {
            Self::from_toml_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to parse YAML config: {}", e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    fn is_toml(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
    }

    fn expand_path(path: &Path) -> PathBuf {
        PathBuf::from(expand_lenient(&path.to_string_lossy(), env_lookup))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(Self::expand_path(Path::new(&path)));
        }

        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(home_dir.join(".config").join("labkey").join("config.yml"))
    }
}
