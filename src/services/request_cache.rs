//! TTL-aware request cache with hit/miss accounting.
//!
//! `RequestCache` is the surface the HTTP layer and the background jobs call.
//! It fingerprints `(endpoint, params)` into a key, delegates persistence to a
//! [`CacheStore`], and keeps request counters for the lifetime of the
//! instance. Clones share the same store and the same counters.

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{
    compute_key, CacheEntry, CacheLookup, CacheStats, CachedPayload, EntryMetadata, InvalidationMatcher,
    RequestParams,
};
use crate::domain::ports::CacheStore;

/// Request counters owned by one cache instance.
#[derive(Debug, Default)]
pub struct CacheCounters {
    requests: AtomicU64,
    hits: AtomicU64,
}

impl CacheCounters {
    fn record(&self, hit: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// `(requests, hits)`
    pub fn snapshot(&self) -> (u64, u64) {
        // Hits are read first so a concurrent lookup never makes hits > requests.
        let hits = self.hits.load(Ordering::Relaxed);
        let requests = self.requests.load(Ordering::Relaxed);
        (requests.max(hits), hits)
    }

    fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }
}

pub struct RequestCache<S: CacheStore> {
    store: Arc<S>,
    counters: Arc<CacheCounters>,
}

impl<S: CacheStore> Clone for RequestCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<S: CacheStore> RequestCache<S> {
    pub fn new(store: S) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub fn from_arc(store: Arc<S>) -> Self {
        Self {
            store,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fingerprint a request. Parameter insertion order never affects the key.
    pub fn compute_key(endpoint: &str, params: &RequestParams) -> String {
        compute_key(endpoint, params)
    }

    /// Look up a fresh entry.
    ///
    /// A hit increments the entry's `access_count` and sets `last_accessed_at`
    /// before returning. Absent and expired entries are a [`CacheLookup::Miss`].
    /// Storage failures are returned as errors and are not counted as requests.
    #[instrument(skip(self, params), fields(key = tracing::field::Empty))]
    pub async fn get(&self, endpoint: &str, params: &RequestParams) -> CacheResult<CacheLookup> {
        let key = compute_key(endpoint, params);
        tracing::Span::current().record("key", key.as_str());

        let lookup = match self.store.fetch_fresh(&key, Utc::now()).await? {
            Some(entry) => CacheLookup::Hit {
                metadata: entry.metadata(),
                payload: entry.value,
            },
            None => CacheLookup::Miss,
        };

        self.counters.record(lookup.is_hit());
        debug!(endpoint, hit = lookup.is_hit(), "cache lookup");
        Ok(lookup)
    }

    /// Serialize `value` and store it under the request's key.
    ///
    /// A `ttl` of `None` or zero stores the entry without expiry. Storing over
    /// an existing key replaces its value, params and expiry and resets
    /// `created_at`, but keeps its `access_count` and `last_accessed_at`: a
    /// refreshed entry is the same cache slot, not a new one.
    ///
    /// Returns the metadata of the row as stored.
    pub async fn set<T>(
        &self,
        endpoint: &str,
        params: &RequestParams,
        value: &T,
        ttl: Option<Duration>,
    ) -> CacheResult<EntryMetadata>
    where
        T: Serialize + ?Sized,
    {
        let payload = CachedPayload::encode(value)?;
        self.set_raw(endpoint, params, payload, ttl).await
    }

    /// Store an already-serialized payload verbatim. Same upsert rules as [`set`](Self::set).
    pub async fn set_raw(
        &self,
        endpoint: &str,
        params: &RequestParams,
        payload: CachedPayload,
        ttl: Option<Duration>,
    ) -> CacheResult<EntryMetadata> {
        if endpoint.is_empty() {
            return Err(CacheError::Validation("endpoint must not be empty".to_string()));
        }

        let entry = CacheEntry::new(endpoint, params, payload, ttl, Utc::now());
        let stored = self.store.upsert(&entry).await?;

        debug!(
            endpoint,
            key = %stored.key,
            bytes = stored.value.len(),
            expires_at = ?stored.expires_at,
            "cache entry stored"
        );
        Ok(stored.metadata())
    }

    /// Delete every entry the matcher selects; returns the number removed.
    pub async fn invalidate(&self, matcher: &InvalidationMatcher) -> CacheResult<u64> {
        matcher.validate()?;
        let deleted = self.store.delete_matching(matcher).await?;
        info!(matcher = %matcher, deleted, "cache invalidated");
        Ok(deleted)
    }

    /// Delete every entry whose expiry has passed. Safe to run alongside traffic.
    pub async fn sweep_expired(&self) -> CacheResult<u64> {
        let deleted = self.store.delete_expired(Utc::now()).await?;
        if deleted > 0 {
            info!(deleted, "swept expired cache entries");
        } else {
            debug!("sweep found no expired entries");
        }
        Ok(deleted)
    }

    pub async fn stats(&self) -> CacheResult<CacheStats> {
        let total_entries = self.store.count().await?;
        let per_endpoint = self.store.endpoint_stats().await?;
        let (requests, hits) = self.counters.snapshot();
        Ok(CacheStats::new(total_entries, requests, hits, per_endpoint))
    }

    /// Zero the request and hit counters. Stored entries are untouched.
    pub fn reset_stats(&self) {
        self.counters.reset();
        info!("cache statistics reset");
    }
}
