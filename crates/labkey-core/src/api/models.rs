use crate::core::table::ResponseMetadata;
use crate::error::ResponseError;
use crate::utils::error_helpers::convert_json_error;
use serde::Serialize;
use serde_json::{Map, Value};

// Authentication models
#[derive(Debug, Serialize)]
pub struct LoginForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// A `selectRows.api` response split into row data and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectRowsResponse {
    pub rows: Vec<Map<String, Value>>,
    pub metadata: ResponseMetadata,
}

impl SelectRowsResponse {
    pub fn parse(body: &str, endpoint: &str) -> Result<Self, ResponseError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| convert_json_error(e, endpoint))?;

        let Value::Object(mut fields) = value else {
            return Err(ResponseError::NotAnObject {
                endpoint: endpoint.to_string(),
            });
        };

        let Some(Value::Array(items)) = fields.remove("rows") else {
            return Err(ResponseError::MissingRows {
                endpoint: endpoint.to_string(),
            });
        };

        let rows = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(row) => Ok(row),
                _ => Err(ResponseError::InvalidRow {
                    endpoint: endpoint.to_string(),
                    index,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rows,
            metadata: ResponseMetadata::new(fields),
        })
    }
}
