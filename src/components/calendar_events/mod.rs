pub mod models;
pub mod time;

pub use models::{CalendarEvent, CalendarEventsInput};

use super::credentials::{ConnectionType, CredentialProvider};
use super::graph::{into_values, GraphClient};
use super::{parse_input, Tool, ToolSpec};
use crate::error::ToolResult;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const TOOL_NAME: &str = "ms365_list_calendar_events";

/// Lists events of the signed-in user's calendar over a window of days
#[derive(Clone)]
pub struct CalendarEventsClient {
    graph: GraphClient,
    credentials: Arc<dyn CredentialProvider>,
    connection_id: String,
}

impl CalendarEventsClient {
    pub fn new(
        graph: GraphClient,
        credentials: Arc<dyn CredentialProvider>,
        connection_id: &str,
    ) -> Self {
        Self {
            graph,
            credentials,
            connection_id: connection_id.to_string(),
        }
    }

    /// `calendarView` URL with the range embedded as-is
    pub fn calendar_view_url(&self, start_datetime: &str, end_datetime: &str) -> String {
        format!(
            "{}?startDateTime={}&endDateTime={}",
            self.graph.endpoint("me/calendarView"),
            start_datetime,
            end_datetime
        )
    }

    /// Events in API order; no client-side sorting
    pub async fn list_events(&self, input: &CalendarEventsInput) -> ToolResult<Vec<CalendarEvent>> {
        let start = time::parse_start_date(input.start.as_deref())?;
        let (start_datetime, end_datetime) = time::date_range(start, input.offset_day)?;

        let connection = self
            .credentials
            .connection(&self.connection_id, ConnectionType::OAuth2AuthCode)
            .await?;

        let url = self.calendar_view_url(&start_datetime, &end_datetime);
        let body = self.graph.get_json(&url, &[], &connection).await?;

        info!("Events on {}:", start);
        let events = into_values(body)
            .iter()
            .map(CalendarEvent::from_graph)
            .inspect(|event| {
                info!(
                    "- {} | {} - {}",
                    event.subject,
                    event.start,
                    event.end.as_deref().unwrap_or("")
                )
            })
            .collect::<Vec<_>>();

        Ok(events)
    }
}

#[async_trait]
impl Tool for CalendarEventsClient {
    fn spec(&self) -> ToolSpec {
        ToolSpec::read_only(TOOL_NAME, "Get Microsoft 365 calendar events")
            .expects(&self.connection_id, ConnectionType::OAuth2AuthCode)
            .with_input::<CalendarEventsInput>()
    }

    async fn invoke(&self, args: Value) -> ToolResult<Value> {
        let input: CalendarEventsInput = parse_input(args)?;
        let events = self.list_events(&input).await?;
        Ok(serde_json::to_value(events)?)
    }
}
