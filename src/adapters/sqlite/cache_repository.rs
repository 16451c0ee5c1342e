//! SQLite implementation of the CacheStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{format_timestamp, parse_datetime, parse_optional_datetime};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{CacheEntry, CachedPayload, EndpointStats, InvalidationMatcher};
use crate::domain::ports::CacheStore;

const ENTRY_COLUMNS: &str =
    "key, endpoint, params, value, created_at, expires_at, access_count, last_accessed_at";

#[derive(Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn fetch_fresh(&self, key: &str, now: DateTime<Utc>) -> CacheResult<Option<CacheEntry>> {
        let now = format_timestamp(now);

        // Freshness check, counter bump and read are one statement so a
        // concurrent upsert cannot interleave between them.
        let row: Option<CacheRow> = sqlx::query_as(&format!(
            r#"UPDATE cache_entries
               SET access_count = access_count + 1, last_accessed_at = ?
               WHERE key = ? AND (expires_at IS NULL OR expires_at >= ?)
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(&now)
        .bind(key)
        .bind(&now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn peek(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let row: Option<CacheRow> =
            sqlx::query_as(&format!("SELECT {ENTRY_COLUMNS} FROM cache_entries WHERE key = ?"))
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn upsert(&self, entry: &CacheEntry) -> CacheResult<CacheEntry> {
        let access_count = i64::try_from(entry.access_count)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let row: CacheRow = sqlx::query_as(&format!(
            r#"INSERT INTO cache_entries (key, endpoint, params, value, created_at, expires_at,
               access_count, last_accessed_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET
                   endpoint = excluded.endpoint,
                   params = excluded.params,
                   value = excluded.value,
                   created_at = excluded.created_at,
                   expires_at = excluded.expires_at
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(&entry.key)
        .bind(&entry.endpoint)
        .bind(&entry.params)
        .bind(entry.value.as_str())
        .bind(format_timestamp(entry.created_at))
        .bind(entry.expires_at.map(format_timestamp))
        .bind(access_count)
        .bind(entry.last_accessed_at.map(format_timestamp))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_matching(&self, matcher: &InvalidationMatcher) -> CacheResult<u64> {
        let result = match matcher {
            InvalidationMatcher::Key(key) => {
                sqlx::query("DELETE FROM cache_entries WHERE key = ?")
                    .bind(key)
                    .execute(&self.pool)
                    .await?
            }
            InvalidationMatcher::Endpoint(endpoint) => {
                sqlx::query("DELETE FROM cache_entries WHERE endpoint = ?")
                    .bind(endpoint)
                    .execute(&self.pool)
                    .await?
            }
            // substr/instr compare literally and case-sensitively, unlike LIKE.
            InvalidationMatcher::EndpointPrefix(prefix) => {
                sqlx::query("DELETE FROM cache_entries WHERE substr(endpoint, 1, length(?)) = ?")
                    .bind(prefix)
                    .bind(prefix)
                    .execute(&self.pool)
                    .await?
            }
            InvalidationMatcher::EndpointContains(fragment) => {
                sqlx::query("DELETE FROM cache_entries WHERE instr(endpoint, ?) > 0")
                    .bind(fragment)
                    .execute(&self.pool)
                    .await?
            }
            InvalidationMatcher::All => {
                sqlx::query("DELETE FROM cache_entries")
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> CacheResult<u64> {
        let result = sqlx::query(
            "DELETE FROM cache_entries WHERE expires_at IS NOT NULL AND expires_at < ?"
        )
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> CacheResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn endpoint_stats(&self) -> CacheResult<Vec<EndpointStats>> {
        let rows: Vec<(String, i64, i64, f64, Option<String>)> = sqlx::query_as(
            r#"SELECT endpoint,
                      COUNT(*),
                      COALESCE(SUM(access_count), 0),
                      COALESCE(AVG(access_count), 0.0),
                      MAX(last_accessed_at)
               FROM cache_entries
               GROUP BY endpoint
               ORDER BY endpoint"#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(endpoint, entry_count, total_accesses, avg_accesses, last_accessed)| {
                Ok(EndpointStats {
                    endpoint,
                    entry_count: entry_count.unsigned_abs(),
                    total_accesses: total_accesses.unsigned_abs(),
                    avg_accesses,
                    last_accessed: parse_optional_datetime(last_accessed)?,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct CacheRow {
    key: String,
    endpoint: String,
    params: String,
    value: String,
    created_at: String,
    expires_at: Option<String>,
    access_count: i64,
    last_accessed_at: Option<String>,
}

impl TryFrom<CacheRow> for CacheEntry {
    type Error = CacheError;

    fn try_from(row: CacheRow) -> Result<Self, Self::Error> {
        Ok(CacheEntry {
            key: row.key,
            endpoint: row.endpoint,
            params: row.params,
            value: CachedPayload::from_raw(row.value),
            created_at: parse_datetime(&row.created_at)?,
            expires_at: parse_optional_datetime(row.expires_at)?,
            access_count: row.access_count.unsigned_abs(),
            last_accessed_at: parse_optional_datetime(row.last_accessed_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::RequestParams;
    use std::time::Duration;

    async fn setup_test_store() -> SqliteCacheStore {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteCacheStore::new(pool)
    }

    fn entry(endpoint: &str, id: i64, ttl: Option<Duration>, now: DateTime<Utc>) -> CacheEntry {
        let params = RequestParams::new().with("id", id);
        CacheEntry::new(endpoint, &params, CachedPayload::from_raw(format!("[{id}]")), ttl, now)
    }

    #[tokio::test]
    async fn test_upsert_and_peek() {
        let store = setup_test_store().await;
        let e = entry("fixtures", 1, Some(Duration::from_secs(60)), Utc::now());

        store.upsert(&e).await.unwrap();

        let stored = store.peek(&e.key).await.unwrap().unwrap();
        assert_eq!(stored.endpoint, "fixtures");
        assert_eq!(stored.value.as_str(), "[1]");
        assert_eq!(stored.access_count, 0);
        assert!(stored.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_fetch_fresh_bumps_counter() {
        let store = setup_test_store().await;
        let now = Utc::now();
        let e = entry("odds", 1, None, now);
        store.upsert(&e).await.unwrap();

        let first = store.fetch_fresh(&e.key, now).await.unwrap().unwrap();
        assert_eq!(first.access_count, 1);
        assert!(first.last_accessed_at.is_some());

        let second = store.fetch_fresh(&e.key, now).await.unwrap().unwrap();
        assert_eq!(second.access_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_fresh_skips_expired_rows() {
        let store = setup_test_store().await;
        let created = Utc::now() - chrono::Duration::seconds(120);
        let e = entry("odds", 1, Some(Duration::from_secs(60)), created);
        store.upsert(&e).await.unwrap();

        assert!(store.fetch_fresh(&e.key, Utc::now()).await.unwrap().is_none());

        // The stale row is untouched until swept.
        let raw = store.peek(&e.key).await.unwrap().unwrap();
        assert_eq!(raw.access_count, 0);
    }

    #[tokio::test]
    async fn test_entry_is_fresh_through_its_expiry_instant() {
        let store = setup_test_store().await;
        let e = entry("odds", 1, Some(Duration::from_secs(60)), Utc::now());
        store.upsert(&e).await.unwrap();
        let expires = e.expires_at.unwrap();

        assert!(store.fetch_fresh(&e.key, expires).await.unwrap().is_some());
        assert_eq!(store.delete_expired(expires).await.unwrap(), 0);

        let after = expires + chrono::Duration::microseconds(1);
        assert!(store.fetch_fresh(&e.key, after).await.unwrap().is_none());
        assert_eq!(store.delete_expired(after).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_preserves_access_count() {
        let store = setup_test_store().await;
        let now = Utc::now();
        let e = entry("fixtures", 1, None, now);
        store.upsert(&e).await.unwrap();
        store.fetch_fresh(&e.key, now).await.unwrap();
        store.fetch_fresh(&e.key, now).await.unwrap();

        let mut refreshed = entry("fixtures", 1, Some(Duration::from_secs(30)), Utc::now());
        refreshed.value = CachedPayload::from_raw("[\"new\"]");
        store.upsert(&refreshed).await.unwrap();

        let stored = store.peek(&e.key).await.unwrap().unwrap();
        assert_eq!(stored.value.as_str(), "[\"new\"]");
        assert_eq!(stored.access_count, 2);
        assert!(stored.last_accessed_at.is_some());
        assert!(stored.expires_at.is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_matching_modes() {
        let store = setup_test_store().await;
        let now = Utc::now();
        for (endpoint, id) in [("fixtures", 1), ("h2h-fixture-1", 2), ("h2h-fixture-2", 3), ("fixtures/h2h", 4)] {
            store.upsert(&entry(endpoint, id, None, now)).await.unwrap();
        }

        let prefix = InvalidationMatcher::EndpointPrefix("h2h".into());
        assert_eq!(store.delete_matching(&prefix).await.unwrap(), 2);

        let contains = InvalidationMatcher::EndpointContains("h2h".into());
        assert_eq!(store.delete_matching(&contains).await.unwrap(), 1);

        let exact = InvalidationMatcher::Endpoint("fixtures".into());
        assert_eq!(store.delete_matching(&exact).await.unwrap(), 1);

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.delete_matching(&InvalidationMatcher::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prefix_treats_wildcards_literally() {
        let store = setup_test_store().await;
        let now = Utc::now();
        store.upsert(&entry("fixtures", 1, None, now)).await.unwrap();
        store.upsert(&entry("odds_live", 2, None, now)).await.unwrap();

        let m = InvalidationMatcher::EndpointPrefix("%".into());
        assert_eq!(store.delete_matching(&m).await.unwrap(), 0);
        let m = InvalidationMatcher::EndpointContains("_".into());
        assert_eq!(store.delete_matching(&m).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_matching_is_case_sensitive_and_exact() {
        let store = setup_test_store().await;
        let now = Utc::now();
        store.upsert(&entry("H2H-fixture-1", 1, None, now)).await.unwrap();
        store.upsert(&entry("fixtures/live", 2, None, now)).await.unwrap();

        let m = InvalidationMatcher::EndpointPrefix("h2h".into());
        assert_eq!(store.delete_matching(&m).await.unwrap(), 0);
        let m = InvalidationMatcher::Endpoint("fixtures".into());
        assert_eq!(store.delete_matching(&m).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let store = setup_test_store().await;
        let past = Utc::now() - chrono::Duration::seconds(600);
        store.upsert(&entry("odds", 1, Some(Duration::from_secs(60)), past)).await.unwrap();
        store.upsert(&entry("odds", 2, Some(Duration::from_secs(3600)), Utc::now())).await.unwrap();
        store.upsert(&entry("leagues", 3, None, past)).await.unwrap();

        assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 1);
        assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_stats() {
        let store = setup_test_store().await;
        let now = Utc::now();
        let a = entry("fixtures", 1, None, now);
        let b = entry("fixtures", 2, None, now);
        let c = entry("odds", 3, None, now);
        for e in [&a, &b, &c] {
            store.upsert(e).await.unwrap();
        }
        store.fetch_fresh(&a.key, now).await.unwrap();
        store.fetch_fresh(&a.key, now).await.unwrap();
        store.fetch_fresh(&b.key, now).await.unwrap();

        let stats = store.endpoint_stats().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].endpoint, "fixtures");
        assert_eq!(stats[0].entry_count, 2);
        assert_eq!(stats[0].total_accesses, 3);
        assert!((stats[0].avg_accesses - 1.5).abs() < f64::EPSILON);
        assert!(stats[0].last_accessed.is_some());
        assert_eq!(stats[1].endpoint, "odds");
        assert_eq!(stats[1].total_accesses, 0);
        assert!(stats[1].last_accessed.is_none());
    }
}
