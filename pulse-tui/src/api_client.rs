//! REST transport for the query cache.

use async_trait::async_trait;
use pulse_cache::Transport;
use pulse_core::{FetchError, FetchResult};
use serde_json::Value;
use std::time::Duration;

use crate::config::TuiConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
}

/// GETs JSON resources relative to a fixed base URL.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        Self::with_timeout(&config.api_base_url, config.request_timeout())
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        reqwest::Url::parse(base_url)
            .map_err(|e| ApiClientError::Config(format!("invalid api_base_url '{base_url}': {e}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path such as `posts?userId=1`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn get_json(&self, path: &str) -> FetchResult<Value> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::transport(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::decode(path, e))
    }
}
