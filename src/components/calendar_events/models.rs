use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Simplified calendar event representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    /// The subject of the event
    pub subject: String,
    /// The time at which the event starts
    pub start: String,
    /// The time at which the event ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Detailed information about the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Map one item of a `calendarView` response. Missing subject or start become empty strings.
    pub fn from_graph(event: &Value) -> Self {
        let subject = event
            .get("subject")
            .and_then(|s| s.as_str())
            .unwrap_or("")
            .to_string();

        let start = event
            .get("start")
            .and_then(|start| start.get("dateTime"))
            .and_then(|dt| dt.as_str())
            .unwrap_or("")
            .to_string();

        let end = event
            .get("end")
            .and_then(|end| end.get("dateTime"))
            .and_then(|dt| dt.as_str())
            .map(|s| s.to_string());

        let description = event
            .get("bodyPreview")
            .and_then(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string());

        CalendarEvent {
            subject,
            start,
            end,
            description,
        }
    }
}

fn default_offset_day() -> i64 {
    5
}

/// Arguments for the calendar listing tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEventsInput {
    /// The date to start the search, format 'YYYY-MM-DD'
    #[serde(default)]
    pub start: Option<String>,
    /// The offset in days to end the search, minimum is 1
    #[serde(default = "default_offset_day")]
    pub offset_day: i64,
}

impl CalendarEventsInput {
    pub fn new(start: &str, offset_day: i64) -> Self {
        Self {
            start: Some(start.to_string()),
            offset_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_graph_full_event() {
        let event = CalendarEvent::from_graph(&json!({
            "subject": "Standup",
            "bodyPreview": "Daily sync",
            "start": {"dateTime": "2024-01-02T09:00:00.0000000", "timeZone": "UTC"},
            "end": {"dateTime": "2024-01-02T09:15:00.0000000", "timeZone": "UTC"}
        }));
        assert_eq!(event.subject, "Standup");
        assert_eq!(event.start, "2024-01-02T09:00:00.0000000");
        assert_eq!(event.end.as_deref(), Some("2024-01-02T09:15:00.0000000"));
        assert_eq!(event.description.as_deref(), Some("Daily sync"));
    }

    #[test]
    fn test_from_graph_missing_fields() {
        let event = CalendarEvent::from_graph(&json!({}));
        assert_eq!(event.subject, "");
        assert_eq!(event.start, "");
        assert!(event.end.is_none());
        assert!(event.description.is_none());
    }

    #[test]
    fn test_serialization_skips_absent_fields() {
        let value = serde_json::to_value(CalendarEvent {
            subject: "A".to_string(),
            start: "s".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(value, json!({"subject": "A", "start": "s"}));
    }
}
