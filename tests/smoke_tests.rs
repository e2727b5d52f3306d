use ms365_tools::components::credentials::{CredentialProvider, StaticCredentialProvider};
use ms365_tools::components::ToolPermission;
use ms365_tools::config::{Config, DEFAULT_CONNECTION_ID, DEFAULT_GRAPH_BASE_URL};
use ms365_tools::startup::build_registry;
use serde_json::Value;
use std::sync::Arc;

fn credentials() -> Arc<dyn CredentialProvider> {
    Arc::new(StaticCredentialProvider::new().with_token(DEFAULT_CONNECTION_ID, "token"))
}

/// Smoke test to verify the default config
#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.connection_id, "ms365");
    assert_eq!(config.graph_base_url, DEFAULT_GRAPH_BASE_URL);
    assert_eq!(config.prefer_header(), "outlook.timezone=\"UTC\"");
    assert!(config.access_token.is_none());
}

/// All three tools are registered with read-only metadata
#[test]
fn test_registry_exposes_tools() {
    let registry = build_registry(&Config::default(), credentials());

    assert_eq!(
        registry.names(),
        vec![
            "ms365_get_date".to_string(),
            "ms365_email_search".to_string(),
            "ms365_list_calendar_events".to_string(),
        ]
    );

    for spec in registry.specs() {
        assert_eq!(spec.permission, ToolPermission::ReadOnly);
        assert!(!spec.description.is_empty());
    }
}

/// Graph tools declare the configured connection as their expected credential
#[test]
fn test_connection_id_is_injected() {
    let config = Config {
        connection_id: "ms365-test".to_string(),
        ..Config::default()
    };
    let registry = build_registry(&config, credentials());

    let spec = registry
        .get("ms365_list_calendar_events")
        .map(|tool| tool.spec())
        .unwrap();
    assert_eq!(spec.expected_credentials.len(), 1);
    assert_eq!(spec.expected_credentials[0].app_id, "ms365-test");

    let spec_json = serde_json::to_value(&spec).unwrap();
    assert_eq!(spec_json["expected_credentials"][0]["type"], "oauth2_auth_code");
    assert!(spec_json["input_schema"]["properties"].get("offset_day").is_some());
}

/// Tools switched off in config are not registered
#[test]
fn test_disabled_tools_are_skipped() {
    let mut config = Config::default();
    config.tools.insert("ms365_email_search".to_string(), false);

    let registry = build_registry(&config, credentials());
    assert!(registry.get("ms365_email_search").is_none());
    assert_eq!(registry.names().len(), 2);
}

/// The date tool works through the registry without any network access
#[tokio::test]
async fn test_invoke_get_date() {
    let registry = build_registry(&Config::default(), credentials());
    let value = registry.invoke("ms365_get_date", Value::Null).await.unwrap();
    assert!(value.as_str().unwrap().starts_with(char::is_numeric));
}

/// Unknown tools are reported as such
#[tokio::test]
async fn test_invoke_unknown_tool() {
    let registry = build_registry(&Config::default(), credentials());
    assert!(registry.invoke("ms365_send_mail", Value::Null).await.is_err());
}
