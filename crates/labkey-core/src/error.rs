use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("CliError: {0}")]
    Cli(#[from] CliError),
    #[error("ConfigError: {0}")]
    Config(#[from] ConfigError),
    #[error("ApiError: {0}")]
    Api(#[from] ApiError),
    #[error("AuthError: {0}")]
    Auth(#[from] AuthError),
    #[error("ResponseError: {0}")]
    Response(#[from] ResponseError),
    #[error("ValidationError: {0}")]
    Validation(#[from] ValidationError),
    #[error("StorageError: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Server index {index} out of range ({available} configured)")]
    UnknownServer { index: usize, available: usize },
}

/// Raised while turning a config document into instance configurations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration field '{field}' is missing for server {server_index}")]
    MissingField { field: String, server_index: usize },
    #[error("Invalid configuration value for '{field}' on server {server_index}: {reason}")]
    InvalidValue {
        field: String,
        server_index: usize,
        reason: String,
    },
    #[error(
        "Environment variable '{variable}' referenced by '{field}' on server {server_index} is not set"
    )]
    UnresolvedVariable {
        field: String,
        variable: String,
        server_index: usize,
    },
    #[error("Invalid placeholder in '{field}' on server {server_index} at position {position}")]
    InvalidPlaceholder {
        field: String,
        server_index: usize,
        position: usize,
    },
}

/// Transport level failures: the server could not be reached or answered
/// with a non-success status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {status} {message}")]
    Http {
        status: u16,
        endpoint: String,
        message: String,
    },
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unable to authenticate with {host}: no {cookie} cookie was issued")]
    NoSessionCookie { host: String, cookie: String },
}

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Response from {endpoint} is not valid JSON: {message}")]
    InvalidJson { endpoint: String, message: String },
    #[error("Response from {endpoint} is not a JSON object")]
    NotAnObject { endpoint: String },
    #[error("Response from {endpoint} has no 'rows' array")]
    MissingRows { endpoint: String },
    #[error("Row {index} in response from {endpoint} is not a JSON object")]
    InvalidRow { endpoint: String, index: usize },
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Aliases '{first}' and '{second}' both map to column '{native}'")]
    AmbiguousAlias {
        native: String,
        first: String,
        second: String,
    },
    #[error("Filter '{key}' must have the form <column>~<operator>")]
    InvalidFilterKey { key: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("Configuration parse error: {message}")]
    ConfigParseError { message: String },
    #[error("Configuration directory not found")]
    ConfigDirNotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl AppError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Cli(_) => ErrorSeverity::Medium,
            AppError::Config(_) => ErrorSeverity::High,
            AppError::Api(api_error) => match api_error {
                ApiError::Http { status, .. } if *status >= 500 => ErrorSeverity::High,
                ApiError::Request { .. } => ErrorSeverity::High,
                _ => ErrorSeverity::Medium,
            },
            AppError::Auth(_) => ErrorSeverity::High,
            AppError::Response(_) => ErrorSeverity::Medium,
            AppError::Validation(_) => ErrorSeverity::Medium,
            AppError::Storage(_) => ErrorSeverity::Critical,
        }
    }

    pub fn troubleshooting_hint(&self) -> Option<String> {
        match self {
            AppError::Auth(AuthError::NoSessionCookie { .. }) => {
                Some("Check the email and password configured for this server".to_string())
            }
            AppError::Api(api_error) if api_error.is_unauthorized() => {
                Some("Log in first, or pass --relogin to retry after logging in".to_string())
            }
            AppError::Config(ConfigError::UnresolvedVariable { variable, .. }) => {
                Some(format!("export {}=... before running", variable))
            }
            AppError::Storage(StorageError::FileIo { .. }) => {
                Some("Pass --config <path> or set LABKEY_CONFIG".to_string())
            }
            AppError::Validation(ValidationError::AmbiguousAlias { .. }) => {
                Some("Each alias must map to a distinct server column".to_string())
            }
            _ => None,
        }
    }
}
