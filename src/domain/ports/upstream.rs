use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::models::RequestParams;

/// Upstream API failures.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Worth retrying: transport errors, 429 and 5xx.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) | Self::Decode(_) => false,
        }
    }
}

/// Port for fetching fresh data from the third-party sports API.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch the response body for `endpoint` with `params`.
    async fn fetch(&self, endpoint: &str, params: &RequestParams) -> Result<Value, UpstreamError>;
}
