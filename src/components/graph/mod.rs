use super::credentials::Connection;
use crate::config::Config;
use crate::error::{Error, ToolResult};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// Thin wrapper issuing authenticated GET requests against Microsoft Graph
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: Client,
    base_url: String,
    prefer: &'static str,
}

impl GraphClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Share an existing HTTP client (and its connection pool)
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            prefer: config.prefer_header(),
        }
    }

    /// Absolute URL for a path relative to the Graph root
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `url` and return the parsed JSON body. Non-success statuses become `Error::Http`.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        connection: &Connection,
    ) -> ToolResult<Value> {
        let mut request = self
            .client
            .get(url)
            .header("Authorization", connection.bearer())
            .header("Prefer", self.prefer);
        if !query.is_empty() {
            request = request.query(query);
        }

        debug!("GET {} ({} query params)", url, query.len());
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::Serialization(format!("Graph response is not valid JSON: {}", e))
        })
    }
}

/// Take the `value` array out of a Graph collection response; anything else yields an empty list
pub fn into_values(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_joins_paths() {
        let config = Config {
            graph_base_url: "https://graph.example.com/v1.0/".to_string(),
            ..Config::default()
        };
        let graph = GraphClient::new(&config);
        assert_eq!(
            graph.endpoint("/me/calendarView"),
            "https://graph.example.com/v1.0/me/calendarView"
        );
    }

    #[test]
    fn test_into_values() {
        assert_eq!(into_values(json!({"value": [1, 2]})), vec![json!(1), json!(2)]);
        assert!(into_values(json!({})).is_empty());
        assert!(into_values(json!({"value": null})).is_empty());
        assert!(into_values(json!([1])).is_empty());
    }
}
