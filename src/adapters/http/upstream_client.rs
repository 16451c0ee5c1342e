//! HTTP client for the third-party football API.
//!
//! The client is schema-agnostic: `endpoint` becomes a path segment under the
//! configured base URL, parameters become the query string, and the JSON body
//! is returned untouched. Transient failures (transport errors, 429, 5xx) are
//! retried with exponential backoff; everything else fails immediately.

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::{Client as ReqwestClient, Url};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::models::{RequestParams, RetryConfig, UpstreamConfig};
use crate::domain::ports::{UpstreamError, UpstreamFetcher};

pub struct UpstreamClient {
    http_client: ReqwestClient,
    base_url: String,
    api_key: Option<String>,
    api_key_header: String,
    retry: RetryConfig,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, retry: &RetryConfig) -> Result<Self, UpstreamError> {
        Url::parse(&config.base_url).map_err(|e| UpstreamError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("sportcache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            api_key_header: config.api_key_header.clone(),
            retry: retry.clone(),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, UpstreamError> {
        let raw = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| UpstreamError::InvalidUrl(format!("{raw}: {e}")))
    }

    async fn fetch_once(&self, endpoint: &str, params: &RequestParams) -> Result<Value, UpstreamError> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http_client.get(url).query(&params.query_pairs());
        if let Some(key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UpstreamFetcher for UpstreamClient {
    async fn fetch(&self, endpoint: &str, params: &RequestParams) -> Result<Value, UpstreamError> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.retry.initial_backoff_ms))
            .with_max_interval(Duration::from_millis(self.retry.max_backoff_ms))
            .with_max_elapsed_time(None)
            .build();
        let attempts = AtomicU32::new(0);
        let max_retries = self.retry.max_retries;

        backoff::future::retry(policy, || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            async move {
                match self.fetch_once(endpoint, params).await {
                    Ok(body) => {
                        debug!(endpoint, attempt, "upstream fetch succeeded");
                        Ok(body)
                    }
                    Err(err) if err.is_transient() && attempt <= max_retries => {
                        warn!(endpoint, attempt, error = %err, "transient upstream failure, retrying");
                        Err(backoff::Error::transient(err))
                    }
                    Err(err) => Err(backoff::Error::permanent(err)),
                }
            }
        })
        .await
    }
}
