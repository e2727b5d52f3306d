use super::{Tool, ToolSpec};
use crate::error::ToolResult;
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde_json::{json, Value};

pub const TOOL_NAME: &str = "ms365_get_date";

/// Format used for the current date, microsecond precision without offset
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Reports the current local date and time
#[derive(Debug, Clone, Copy, Default)]
pub struct DateProvider;

impl DateProvider {
    pub fn new() -> Self {
        Self
    }

    /// Current local date-time in ISO-8601
    pub fn now(&self) -> String {
        format_timestamp(Local::now().naive_local())
    }
}

/// Format a local date-time the way the tool reports it
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format(DATE_FORMAT).to_string()
}

#[async_trait]
impl Tool for DateProvider {
    fn spec(&self) -> ToolSpec {
        ToolSpec::read_only(TOOL_NAME, "Get current date")
    }

    async fn invoke(&self, _args: Value) -> ToolResult<Value> {
        Ok(json!(self.now()))
    }
}
