use crate::error::{config_error, ToolResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Connection identifier the tools declare as their expected credential
pub const DEFAULT_CONNECTION_ID: &str = "ms365";

/// Microsoft Graph v1.0 root
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Event and message times are requested in UTC, matching the `Z`-suffixed calendar range
pub const PREFER_HEADER: &str = "outlook.timezone=\"UTC\"";

/// Default location of the tool toggle file
pub const TOOLS_CONFIG_PATH: &str = "config/tools.toml";

/// Main configuration structure for the tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Named connection used to resolve the OAuth2 token
    pub connection_id: String,
    /// Graph API root, without trailing slash
    pub graph_base_url: String,
    /// Static bearer token, if provided through the environment
    pub access_token: Option<String>,
    /// Azure AD application (client) ID
    pub client_id: Option<String>,
    /// Azure AD client secret
    pub client_secret: Option<String>,
    /// Azure AD tenant, `common` for multi-tenant apps
    pub tenant: String,
    /// Redis URL for the token store
    pub redis_url: String,
    /// Map of tool names to their enabled status
    pub tools: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_id: DEFAULT_CONNECTION_ID.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            access_token: None,
            client_id: None,
            client_secret: None,
            tenant: "common".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            tools: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment and the optional tools file
    pub fn load() -> ToolResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let connection_id = env::var("MS365_CONNECTION_ID").unwrap_or(defaults.connection_id);
        if connection_id.trim().is_empty() {
            return Err(config_error("MS365_CONNECTION_ID must not be empty"));
        }

        let graph_base_url = env::var("MS365_GRAPH_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.graph_base_url);
        url::Url::parse(&graph_base_url)
            .map_err(|e| config_error(&format!("Invalid MS365_GRAPH_BASE_URL: {}", e)))?;

        let access_token = env::var("MS365_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());
        let client_id = env::var("MS365_CLIENT_ID").ok();
        let client_secret = env::var("MS365_CLIENT_SECRET").ok();
        let tenant = env::var("MS365_TENANT").unwrap_or(defaults.tenant);
        let redis_url = env::var("REDIS_URL").unwrap_or(defaults.redis_url);

        let tools = Self::load_tool_toggles(Path::new(TOOLS_CONFIG_PATH))?;

        Ok(Config {
            connection_id,
            graph_base_url,
            access_token,
            client_id,
            client_secret,
            tenant,
            redis_url,
            tools,
        })
    }

    /// Read tool toggles from a TOML file; a missing file means all tools are enabled
    pub fn load_tool_toggles(path: &Path) -> ToolResult<HashMap<String, bool>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str::<HashMap<String, bool>>(&content)?)
    }

    /// Check if a tool is enabled; tools are enabled unless switched off
    pub fn is_tool_enabled(&self, name: &str) -> bool {
        *self.tools.get(name).unwrap_or(&true)
    }

    /// Value for the `Prefer` header
    pub fn prefer_header(&self) -> &'static str {
        PREFER_HEADER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_enabled_by_default() {
        let mut config = Config::default();
        assert!(config.is_tool_enabled("ms365_get_date"));

        config.tools.insert("ms365_get_date".to_string(), false);
        assert!(!config.is_tool_enabled("ms365_get_date"));
    }

    #[test]
    fn test_prefer_header() {
        let config = Config::default();
        assert_eq!(config.prefer_header(), "outlook.timezone=\"UTC\"");
    }

    #[test]
    fn test_missing_toggle_file() {
        let toggles = Config::load_tool_toggles(Path::new("does/not/exist.toml")).unwrap();
        assert!(toggles.is_empty());
    }
}
