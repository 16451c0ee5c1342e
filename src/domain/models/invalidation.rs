//! Invalidation match modes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::request_key::{compute_key, RequestParams};
use crate::domain::errors::{CacheError, CacheResult};

/// Selects which cache entries an invalidation removes.
///
/// Every mode is an exact, case-sensitive comparison on the stored `key` or
/// `endpoint` column. There is no free-text pattern: SQL wildcards in the
/// supplied text match only themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum InvalidationMatcher {
    /// One entry, by its full key.
    Key(String),
    /// Every entry whose endpoint equals the given name.
    Endpoint(String),
    /// Every entry whose endpoint starts with the given prefix.
    EndpointPrefix(String),
    /// Every entry whose endpoint contains the given fragment.
    EndpointContains(String),
    /// Every entry.
    All,
}

impl InvalidationMatcher {
    /// Matcher for the single entry of a request.
    pub fn request(endpoint: &str, params: &RequestParams) -> Self {
        Self::Key(compute_key(endpoint, params))
    }

    /// Reject patterns that would silently widen into a full flush.
    pub fn validate(&self) -> CacheResult<()> {
        match self {
            Self::Key(s) | Self::Endpoint(s) | Self::EndpointPrefix(s) | Self::EndpointContains(s)
                if s.is_empty() =>
            {
                Err(CacheError::Validation(format!(
                    "{} invalidation requires a non-empty value; use All to flush",
                    self.mode()
                )))
            }
            _ => Ok(()),
        }
    }

    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Endpoint(_) => "endpoint",
            Self::EndpointPrefix(_) => "endpoint_prefix",
            Self::EndpointContains(_) => "endpoint_contains",
            Self::All => "all",
        }
    }
}

impl fmt::Display for InvalidationMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(s) | Self::Endpoint(s) | Self::EndpointPrefix(s) | Self::EndpointContains(s) => {
                write!(f, "{}={}", self.mode(), s)
            }
            Self::All => f.write_str("all"),
        }
    }
}
