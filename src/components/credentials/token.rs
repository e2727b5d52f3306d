use super::{Connection, ConnectionType, CredentialProvider};
use crate::config::Config;
use crate::error::{auth_error, ToolResult};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client as RedisClient};
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

/// OAuth2 token store kept in Redis, refreshed against the Microsoft identity platform
#[derive(Clone)]
pub struct RedisTokenStore {
    redis: RedisClient,
    client: Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

/// Token endpoint for a tenant
pub fn token_url(tenant: &str) -> String {
    format!("https://login.microsoftonline.com/{}/oauth2/v2.0/token", tenant)
}

/// Redis key holding the token for a connection
pub fn redis_key(app_id: &str) -> String {
    format!("ms365_token:{}", app_id)
}

impl RedisTokenStore {
    pub fn new(config: &Config) -> ToolResult<Self> {
        let redis = RedisClient::open(config.redis_url.as_str())?;

        Ok(Self {
            redis,
            client: Client::new(),
            token_url: token_url(&config.tenant),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Get the stored token, refreshing it when expired
    pub async fn get_token(&self, app_id: &str) -> ToolResult<Value> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(redis_key(app_id)).await?;

        let token_str = stored.ok_or_else(|| {
            auth_error(&format!(
                "No token stored for connection '{}'. Run get_ms365_token first.",
                app_id
            ))
        })?;
        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| auth_error(&format!("Failed to parse token JSON: {}", e)))?;

        match token.get("expires_at").and_then(|v| v.as_i64()) {
            Some(expiry) if expiry > Utc::now().timestamp() => Ok(token),
            Some(_) => {
                info!("Token for {} expired, refreshing", app_id);
                let refreshed = self.refresh_token(&token).await?;
                self.set_token(app_id, refreshed.clone()).await?;
                Ok(refreshed)
            }
            None => Ok(token),
        }
    }

    /// Exchange the stored refresh token for a new access token
    async fn refresh_token(&self, token: &Value) -> ToolResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| auth_error("No refresh token in token data"))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| auth_error("MS365_CLIENT_ID is required to refresh tokens"))?;

        refresh_access_token(
            &self.client,
            &self.token_url,
            client_id,
            self.client_secret.as_deref(),
            refresh_token,
        )
        .await
    }

    /// Store a token for a connection
    pub async fn set_token(&self, app_id: &str, token: Value) -> ToolResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set(redis_key(app_id), token.to_string()).await?;
        debug!("Stored token for {}", app_id);
        Ok(())
    }
}

/// Post a `refresh_token` grant and return the token record to store
pub async fn refresh_access_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: Option<&str>,
    refresh_token: &str,
) -> ToolResult<Value> {
    let mut params = vec![
        ("client_id", client_id.to_string()),
        ("refresh_token", refresh_token.to_string()),
        ("grant_type", "refresh_token".to_string()),
    ];
    if let Some(secret) = client_secret {
        params.push(("client_secret", secret.to_string()));
    }

    let response = client
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!(
            "Failed to refresh token: HTTP {} - {}",
            status, error_body
        )));
    }

    let new_token: Value = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

    stamp_token(new_token, Some(refresh_token))
}

/// Normalize a token endpoint response into `{access_token, refresh_token, expires_at}`.
/// Microsoft may rotate the refresh token; the previous one is kept when it does not.
pub fn stamp_token(response: Value, previous_refresh: Option<&str>) -> ToolResult<Value> {
    let access_token = response
        .get("access_token")
        .cloned()
        .ok_or_else(|| auth_error("Token response missing 'access_token' field"))?;

    let mut token_data = Map::new();
    token_data.insert("access_token".to_string(), access_token);

    let refresh = response
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .or(previous_refresh);
    if let Some(refresh) = refresh {
        token_data.insert("refresh_token".to_string(), json!(refresh));
    }

    let expires_in = response
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);
    let expires_at = Utc::now().timestamp() + expires_in;
    token_data.insert("expires_at".to_string(), json!(expires_at));

    Ok(Value::Object(token_data))
}

#[async_trait]
impl CredentialProvider for RedisTokenStore {
    async fn connection(&self, app_id: &str, _kind: ConnectionType) -> ToolResult<Connection> {
        let token = self.get_token(app_id).await?;
        let access_token = token
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| auth_error("No access token available"))?;
        Ok(Connection::new(app_id, access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_stamp_token_keeps_previous_refresh() {
        let token = stamp_token(json!({"access_token": "new", "expires_in": 60}), Some("old-refresh")).unwrap();
        assert_eq!(token["access_token"], "new");
        assert_eq!(token["refresh_token"], "old-refresh");
        assert!(token["expires_at"].as_i64().unwrap() > Utc::now().timestamp());
    }

    #[test]
    fn test_stamp_token_prefers_rotated_refresh() {
        let token = stamp_token(
            json!({"access_token": "new", "refresh_token": "rotated"}),
            Some("old-refresh"),
        )
        .unwrap();
        assert_eq!(token["refresh_token"], "rotated");
    }

    #[test]
    fn test_stamp_token_requires_access_token() {
        assert!(stamp_token(json!({"expires_in": 60}), None).is_err());
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            token_url("common"),
            "https://login.microsoftonline.com/common/oauth2/v2.0/token"
        );
        assert_eq!(redis_key("ms365"), "ms365_token:ms365");
    }

    #[tokio::test]
    async fn test_refresh_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=r1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a2",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let token = refresh_access_token(
            &Client::new(),
            &format!("{}/token", server.uri()),
            "client",
            None,
            "r1",
        )
        .await
        .unwrap();

        assert_eq!(token["access_token"], "a2");
        assert_eq!(token["refresh_token"], "r1");
    }

    #[tokio::test]
    async fn test_refresh_access_token_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = refresh_access_token(&Client::new(), &server.uri(), "client", None, "r1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid_grant"));
    }
}
