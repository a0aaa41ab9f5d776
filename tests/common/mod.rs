#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::header::ACCEPT;
use serde_json::Value;

use vocabking_api::auth::{self, SigningKey, TOKEN_TTL};
use vocabking_api::config::AppConfig;
use vocabking_api::Meta;

pub const JSON: &str = "application/json";
pub const TEST_KEY: &str = "integration-test-signing-key-0123456789";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub key: SigningKey,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST with the required `Accept` header already set
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .post(self.url(path))
            .header(ACCEPT, JSON)
    }

    /// A token signed with this server's key, issued `age_secs` ago
    pub fn token(&self, username: &str, age_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp() - age_secs;
        auth::issue(username, &self.key, now, TOKEN_TTL, Meta::new())
            .expect("issue test token")
            .token
    }
}

pub fn development_config() -> AppConfig {
    AppConfig::development(SigningKey::from_secret(TEST_KEY).expect("non-empty key"))
}

/// Serve the app on a free local port for the lifetime of the current test runtime
pub async fn spawn_server(config: AppConfig) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let key = config.security.signing_key.clone();

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", base_url))?;
    let app = vocabking_api::app(config)?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer { port, base_url, key })
}

pub async fn ensure_server() -> Result<TestServer> {
    spawn_server(development_config()).await
}

/// Check the error envelope shape and return its `data` object
pub fn assert_error_envelope(body: &Value, error: &str) -> Value {
    assert_eq!(body["result"], "error", "body: {}", body);
    let data = body["data"].clone();
    assert_eq!(data["error"], error, "body: {}", body);
    let ops = data["ops"].as_array().expect("ops array");
    let stack = data["stack"].as_array().expect("stack array");
    assert_eq!(ops.len(), stack.len(), "body: {}", body);
    assert!(!ops.is_empty());
    data
}
