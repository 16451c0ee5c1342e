//! Read-through fetching: cache first, upstream on a miss.
//!
//! This is the sequence the dashboard's HTTP handlers run for every route.
//! A cache storage failure is logged and treated like a miss so the caller
//! still gets fresh data; only an upstream failure is surfaced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::errors::CacheError;
use crate::domain::models::{CacheLookup, RequestParams, TtlPolicy};
use crate::domain::ports::{CacheStore, UpstreamError, UpstreamFetcher};
use crate::services::request_cache::RequestCache;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Cache operation failed: {0}")]
    Cache(#[from] CacheError),
}

/// Response handed back to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse {
    pub data: Value,
    pub from_cache: bool,
    /// When the data was fetched from upstream.
    pub last_update: DateTime<Utc>,
}

pub struct CachedFetcher<S: CacheStore, U: UpstreamFetcher> {
    cache: RequestCache<S>,
    upstream: Arc<U>,
    ttl_policy: TtlPolicy,
}

impl<S: CacheStore, U: UpstreamFetcher> CachedFetcher<S, U> {
    pub fn new(cache: RequestCache<S>, upstream: Arc<U>, ttl_policy: TtlPolicy) -> Self {
        Self {
            cache,
            upstream,
            ttl_policy,
        }
    }

    pub fn cache(&self) -> &RequestCache<S> {
        &self.cache
    }

    /// Serve from cache when fresh, otherwise fetch, store and return fresh data.
    pub async fn fetch(&self, endpoint: &str, params: &RequestParams) -> Result<CachedResponse, FetchError> {
        match self.cache.get(endpoint, params).await {
            Ok(CacheLookup::Hit { payload, metadata }) => match payload.decode::<Value>() {
                Ok(data) => {
                    return Ok(CachedResponse {
                        data,
                        from_cache: true,
                        last_update: metadata.created_at,
                    });
                }
                Err(err) => {
                    warn!(endpoint, error = %err, "cached payload unreadable, refetching");
                }
            },
            Ok(CacheLookup::Miss) => debug!(endpoint, "cache miss"),
            Err(err) => {
                warn!(endpoint, error = %err, "cache lookup failed, fetching fresh data");
            }
        }

        let data = self.upstream.fetch(endpoint, params).await?;
        let ttl = self.ttl_policy.ttl_for_request(endpoint, params);
        let last_update = match self.cache.set(endpoint, params, &data, ttl).await {
            Ok(stored) => stored.created_at,
            Err(err) => {
                warn!(endpoint, error = %err, "failed to store fresh data in cache");
                Utc::now()
            }
        };

        Ok(CachedResponse {
            data,
            from_cache: false,
            last_update,
        })
    }

    /// Fetch from upstream unconditionally and store the result.
    ///
    /// Unlike [`fetch`](Self::fetch), a failure to store is returned as an error.
    pub async fn refresh(&self, endpoint: &str, params: &RequestParams) -> Result<CachedResponse, FetchError> {
        let data = self.upstream.fetch(endpoint, params).await?;
        let ttl = self.ttl_policy.ttl_for_request(endpoint, params);
        let stored = self.cache.set(endpoint, params, &data, ttl).await?;

        Ok(CachedResponse {
            data,
            from_cache: false,
            last_update: stored.created_at,
        })
    }
}
