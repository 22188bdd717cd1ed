use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use beacon_core::config::UpstreamConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("upstream request failed: {0}")]
    Network(String),
    #[error("upstream body was not valid JSON: {0}")]
    Decode(String),
    #[error("http client could not be built: {0}")]
    Build(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status(404))
    }
}

/// Single-request JSON GET seam. Implementations must not retry.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError>;
}

pub struct HttpTransport {
    client: Client,
    api_token: Option<SecretString>,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| TransportError::Build(error.to_string()))?;

        Ok(Self { client, api_token: config.api_token.clone() })
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response =
            request.send().await.map_err(|error| TransportError::Network(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|error| TransportError::Decode(error.to_string()))
    }
}

/// In-memory transport serving fixed responses by URL. Unknown URLs answer 404.
#[derive(Clone, Debug, Default)]
pub struct StaticTransport {
    responses: HashMap<String, Result<Value, TransportError>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, url: impl Into<String>, body: Value) -> Self {
        self.responses.insert(url.into(), Ok(body));
        self
    }

    pub fn with_error(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }
}

#[async_trait]
impl UpstreamTransport for StaticTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.responses.get(url).cloned().unwrap_or(Err(TransportError::Status(404)))
    }
}
