//! Remote recommendation API transport
//!
//! [`Transport`] is the seam between the service adapters and the network.
//! [`HttpTransport`] talks to the real API with reqwest; tests substitute
//! their own implementation.

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const USER_AGENT: &str = concat!("shelf/", env!("CARGO_PKG_VERSION"));

/// JSON request/response transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with query parameters, returning the decoded JSON body
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError>;

    /// POST a JSON body to `path`, returning the decoded JSON body
    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Status(status.as_u16(), error_text));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET remote API");

        let response = self.http_client.get(&url).query(query).send().await?;
        Self::decode(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST remote API");

        let response = self.http_client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }
}
