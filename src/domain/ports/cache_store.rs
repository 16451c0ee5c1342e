use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::CacheResult;
use crate::domain::models::{CacheEntry, EndpointStats, InvalidationMatcher};

/// Repository port for the persisted cache table.
///
/// Each method must be atomic for the rows it touches; callers rely on the
/// storage engine rather than an in-process lock.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Return the entry for `key` if it is fresh at `now`, bumping its
    /// `access_count` and setting `last_accessed_at = now` in the same step.
    ///
    /// Returns `None` for absent or expired entries without touching them.
    async fn fetch_fresh(&self, key: &str, now: DateTime<Utc>) -> CacheResult<Option<CacheEntry>>;

    /// Read an entry without side effects, fresh or not.
    async fn peek(&self, key: &str) -> CacheResult<Option<CacheEntry>>;

    /// Insert or replace the entry with the same key.
    ///
    /// Replaces `endpoint`, `params`, `value`, `created_at` and `expires_at`;
    /// keeps the stored `access_count` and `last_accessed_at`. Returns the row
    /// as written.
    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<CacheEntry>;

    /// Delete matching entries, returning how many were removed.
    async fn delete_matching(&self, matcher: &InvalidationMatcher) -> CacheResult<u64>;

    /// Delete entries whose `expires_at` is before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64>;

    /// Number of stored rows, expired or not.
    async fn count(&self) -> CacheResult<u64>;

    /// Per-endpoint aggregates ordered by endpoint name.
    async fn endpoint_stats(&self) -> CacheResult<Vec<EndpointStats>>;
}
