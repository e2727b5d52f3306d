pub mod token;

pub use token::RedisTokenStore;

use crate::error::{auth_error, ToolResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How a connection obtains its credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionType {
    #[serde(rename = "oauth2_auth_code")]
    OAuth2AuthCode,
    #[serde(rename = "bearer_token")]
    BearerToken,
}

/// A resolved credential for a named connection
#[derive(Clone)]
pub struct Connection {
    app_id: String,
    access_token: String,
}

impl Connection {
    pub fn new(app_id: &str, access_token: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("app_id", &self.app_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Resolves credentials for named connections
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn connection(&self, app_id: &str, kind: ConnectionType) -> ToolResult<Connection>;
}

/// Provider backed by fixed tokens, e.g. one passed through the environment
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    tokens: HashMap<String, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, app_id: &str, access_token: &str) -> Self {
        self.tokens
            .insert(app_id.to_string(), access_token.to_string());
        self
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn connection(&self, app_id: &str, _kind: ConnectionType) -> ToolResult<Connection> {
        self.tokens
            .get(app_id)
            .filter(|token| !token.is_empty())
            .map(|token| Connection::new(app_id, token))
            .ok_or_else(|| auth_error(&format!("No credential configured for connection '{}'", app_id)))
    }
}
