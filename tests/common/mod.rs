//! Common test utilities for integration tests

#![allow(dead_code)]

use sportcache::adapters::sqlite::{create_migrated_test_pool, initialize_database, SqliteCacheStore};
use sportcache::RequestCache;
use std::path::PathBuf;
use tempfile::TempDir;

/// Cache over a fresh in-memory database.
pub async fn memory_cache() -> RequestCache<SqliteCacheStore> {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test database");
    RequestCache::new(SqliteCacheStore::new(pool))
}

/// Cache over a migrated database file in a temporary directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn file_cache() -> (TempDir, PathBuf, RequestCache<SqliteCacheStore>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("cache.db");
    let pool = initialize_database(&format!("sqlite:{}", db_path.display()), None)
        .await
        .expect("failed to open file database");
    (dir, db_path, RequestCache::new(SqliteCacheStore::new(pool)))
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
