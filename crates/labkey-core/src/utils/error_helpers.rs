use crate::error::{ApiError, ResponseError};

/// Helper functions for standardizing error conversions across the codebase
/// Convert reqwest errors to ApiError with endpoint context
pub fn convert_request_error(error: reqwest::Error, endpoint: &str) -> ApiError {
    match error.status() {
        Some(status) => ApiError::Http {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        },
        None => ApiError::Request {
            endpoint: endpoint.to_string(),
            message: error.to_string(),
        },
    }
}

/// Convert JSON deserialization errors to ResponseError with endpoint context
pub fn convert_json_error(error: serde_json::Error, endpoint: &str) -> ResponseError {
    ResponseError::InvalidJson {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

/// Convert a non-success status into ApiError::Http, keeping the body as message
pub fn convert_status_error(status: reqwest::StatusCode, endpoint: &str, body: String) -> ApiError {
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body
    };

    ApiError::Http {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        message,
    }
}
