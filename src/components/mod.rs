use crate::config::Config;
use crate::error::{request_error, Error, ToolResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

use credentials::ConnectionType;

// Export components
pub mod calendar_events;
pub mod credentials;
pub mod email_search;
pub mod get_date;
pub mod graph;

pub use calendar_events::CalendarEventsClient;
pub use email_search::EmailSearchClient;
pub use get_date::DateProvider;

/// Permission marker a host uses to decide whether a tool may run unattended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPermission {
    ReadOnly,
    ReadWrite,
    Admin,
}

/// Credential a tool expects the host to have configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCredential {
    pub app_id: String,
    #[serde(rename = "type")]
    pub kind: ConnectionType,
}

/// Registration metadata for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub permission: ToolPermission,
    #[serde(default)]
    pub expected_credentials: Vec<ExpectedCredential>,
    pub input_schema: Value,
}

impl ToolSpec {
    /// Read-only spec with no credentials and an empty input schema
    pub fn read_only(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.trim().to_string(),
            permission: ToolPermission::ReadOnly,
            expected_credentials: Vec::new(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Declare a credential the host must provide
    pub fn expects(mut self, app_id: &str, kind: ConnectionType) -> Self {
        self.expected_credentials.push(ExpectedCredential {
            app_id: app_id.to_string(),
            kind,
        });
        self
    }

    /// Describe the tool input with the JSON schema of `T`
    pub fn with_input<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.input_schema = serde_json::to_value(schema).unwrap_or(Value::Null);
        self
    }
}

/// Tool trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Registration metadata
    fn spec(&self) -> ToolSpec;

    /// Run the tool with JSON arguments, returning a JSON result
    async fn invoke(&self, args: Value) -> ToolResult<Value>;
}

/// Decode tool arguments; `null` is treated as an empty object so every field takes its default
pub fn parse_input<T: DeserializeOwned>(args: Value) -> ToolResult<T> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| request_error(&format!("Invalid tool arguments: {}", e)))
}

/// Registry for all tools exposed to the host
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.spec().name;
        if self.get(&name).is_some() {
            warn!("Tool {} already registered, replacing it", name);
            self.tools.retain(|t| t.spec().name != name);
        }
        info!("Registering tool: {}", name);
        self.tools.push(Box::new(tool));
    }

    /// Register a tool only if the configuration leaves it enabled
    pub fn register_if_enabled<T: Tool + 'static>(&mut self, config: &Config, tool: T) {
        let name = tool.spec().name;
        if config.is_tool_enabled(&name) {
            self.register(tool);
        } else {
            info!("Tool {} disabled by configuration", name);
        }
    }

    /// Names of all registered tools, in registration order
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.spec().name).collect()
    }

    /// Metadata for every registered tool
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.spec().name == name)
            .map(|t| t.as_ref())
    }

    /// Invoke a tool by name
    pub async fn invoke(&self, name: &str, args: Value) -> ToolResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        info!("Invoking tool: {}", name);
        tool.invoke(args).await
    }
}
