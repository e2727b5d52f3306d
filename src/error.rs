use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the tools
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authentication error: {0}")]
    #[diagnostic(code(ms365_tools::authentication))]
    Authentication(String),

    #[error("Invalid request: {0}")]
    #[diagnostic(code(ms365_tools::request))]
    RequestConstruction(String),

    #[error("Graph API request failed: HTTP {status} - {body}")]
    #[diagnostic(code(ms365_tools::http))]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    #[diagnostic(code(ms365_tools::transport))]
    Transport(#[from] reqwest::Error),

    #[error("Environment error: {0}")]
    #[diagnostic(code(ms365_tools::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ms365_tools::config))]
    Config(String),

    #[error("Unknown tool: {0}")]
    #[diagnostic(code(ms365_tools::unknown_tool))]
    UnknownTool(String),

    #[error(transparent)]
    #[diagnostic(code(ms365_tools::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(ms365_tools::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(ms365_tools::other))]
    Other(String),
}

impl Error {
    /// Status code of a failed Graph response, if this is one
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Authentication(format!("Token store error: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type ToolResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create request construction errors
pub fn request_error(message: &str) -> Error {
    Error::RequestConstruction(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
