use ms365_tools::components::credentials::token::{stamp_token, token_url};
use ms365_tools::components::credentials::RedisTokenStore;
use ms365_tools::config::Config;
use ms365_tools::error::{auth_error, env_error, other_error, ToolResult};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const SCOPES: &str = "offline_access User.Read Mail.Read Calendars.Read";

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> ToolResult<()> {
    // Load configuration
    let config = Config::load()?;
    let token_store = RedisTokenStore::new(&config)?;

    let client_id = config
        .client_id
        .clone()
        .ok_or_else(|| env_error("MS365_CLIENT_ID"))?;

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = format!(
        "https://login.microsoftonline.com/{}/oauth2/v2.0/authorize?\
        client_id={}&\
        response_type=code&\
        redirect_uri={}&\
        response_mode=query&\
        scope={}&\
        state={}",
        config.tenant,
        urlencoding::encode(&client_id),
        urlencoding::encode(REDIRECT_URI),
        urlencoding::encode(SCOPES),
        state
    );

    // Open browser for authorization
    println!("Opening browser for Microsoft 365 authorization...");
    if webbrowser::open(&auth_url).is_err() {
        println!("Could not open a browser, visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    // Handle the callback; the browser always gets an answer, success or not
    let request = server.recv()?;
    let callback_url = request.url().to_string();
    let result = complete_authorization(&config, &token_store, client_id, &state, &callback_url).await;

    let (status, message) = match &result {
        Ok(()) => (200u16, "Authorization successful! You can close this window.".to_string()),
        Err(e) => (400u16, format!("Authorization failed: {}", e)),
    };
    request.respond(tiny_http::Response::from_string(message).with_status_code(status))?;

    result?;
    println!("Token for connection '{}' saved to Redis!", config.connection_id);

    Ok(())
}

/// Extract the authorization code from the callback path, checking state and error parameters
fn read_callback(callback_path: &str, expected_state: &str) -> ToolResult<String> {
    let callback = Url::parse(&format!("{}{}", REDIRECT_URI, callback_path))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |key: &str| {
        callback
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        let description = param("error_description").unwrap_or_default();
        return Err(auth_error(&format!("{} {}", error, description).trim().to_string()));
    }
    if param("state").as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }
    param("code").ok_or_else(|| auth_error("No authorization code found in callback"))
}

/// Exchange the callback code for tokens and store them for the configured connection
async fn complete_authorization(
    config: &Config,
    token_store: &RedisTokenStore,
    client_id: String,
    state: &str,
    callback_path: &str,
) -> ToolResult<()> {
    let code = read_callback(callback_path, state)?;

    // Exchange code for tokens
    let mut form = vec![
        ("client_id", client_id),
        ("code", code),
        ("redirect_uri", REDIRECT_URI.to_string()),
        ("grant_type", "authorization_code".to_string()),
        ("scope", SCOPES.to_string()),
    ];
    if let Some(secret) = &config.client_secret {
        form.push(("client_secret", secret.clone()));
    }

    let response = reqwest::Client::new()
        .post(token_url(&config.tenant))
        .form(&form)
        .send()
        .await?;

    if !response.status().is_success() {
        let error_text = response.text().await?;
        return Err(auth_error(&format!("Failed to get token: {}", error_text)));
    }

    let token_data = stamp_token(response.json().await?, None)?;

    token_store.set_token(&config.connection_id, token_data).await
}
