//! Validation of instance configuration values

use crate::error::ConfigError;

/// Validate that a host is an absolute http(s) URL
pub fn validate_host(host: &str, server_index: usize) -> Result<(), ConfigError> {
    validate_not_empty("host", host, server_index)?;

    if !host.starts_with("http://") && !host.starts_with("https://") {
        return Err(ConfigError::InvalidValue {
            field: "host".to_string(),
            server_index,
            reason: format!("'{}' must start with http:// or https://", host),
        });
    }

    reqwest::Url::parse(host).map_err(|e| ConfigError::InvalidValue {
        field: "host".to_string(),
        server_index,
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Validate that a required string field is not blank
pub fn validate_not_empty(field: &str, value: &str, server_index: usize) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            server_index,
            reason: "value cannot be empty".to_string(),
        });
    }
    Ok(())
}
